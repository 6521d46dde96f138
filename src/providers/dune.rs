use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::{ensure_success, http_client, ProviderError};
use crate::database::models::WhaleFlow;

const PROVIDER: &str = "Dune";

const STATE_COMPLETED: &str = "QUERY_STATE_COMPLETED";
const STATE_FAILED: &str = "QUERY_STATE_FAILED";

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    execution_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    state: String,
    #[serde(default)]
    error: Option<ExecutionError>,
}

#[derive(Debug, Deserialize)]
struct ExecutionError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsResponse {
    result: Option<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    rows: Vec<WhaleRow>,
}

/// Row shape of the whale-flow query
#[derive(Debug, Clone, Deserialize)]
pub struct WhaleRow {
    #[serde(default)]
    pub date: Option<String>,
    pub whale_to_exchange: Option<f64>,
    pub exchange_to_whale: Option<f64>,
    pub net_whale_selling: Option<f64>,
    pub whale_exchange_tx_count: Option<f64>,
    pub market_sentiment: Option<String>,
}

impl WhaleRow {
    /// Dune renders dates as `2024-05-01 00:00:00.000 UTC`; only the day is kept.
    pub fn into_flow(self) -> Option<WhaleFlow> {
        let Some(raw) = self.date.as_deref() else {
            tracing::warn!("Skipping Dune row without a date");
            return None;
        };
        let day = raw.get(..10).unwrap_or(raw);
        let date = match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!("Skipping Dune row with date {:?}: {}", raw, e);
                return None;
            }
        };

        Some(WhaleFlow {
            date,
            whale_to_exchange: self.whale_to_exchange,
            exchange_to_whale: self.exchange_to_whale,
            net_whale_selling: self.net_whale_selling,
            whale_exchange_tx_count: self.whale_exchange_tx_count,
            market_sentiment: self.market_sentiment,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DuneClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl DuneClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            poll_attempts: 30,
            poll_interval: Duration::from_secs(10),
        })
    }

    pub fn with_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.poll_attempts = attempts.max(1);
        self.poll_interval = interval;
        self
    }

    fn key(&self) -> Result<&str, ProviderError> {
        self.api_key.as_deref().ok_or(ProviderError::MissingApiKey(PROVIDER))
    }

    /// Executes the saved query, waits for it to finish and returns its rows
    pub async fn run_query(&self, query_id: u64) -> Result<Vec<WhaleRow>, ProviderError> {
        let key = self.key()?;
        let execution_id = self.execute(key, query_id).await?;
        tracing::info!("Dune query {} started as execution {}", query_id, execution_id);

        self.wait_for_completion(key, &execution_id).await?;

        let rows = self.results(key, &execution_id).await?;
        if rows.is_empty() {
            return Err(ProviderError::invalid(PROVIDER, "No data received from Dune."));
        }
        Ok(rows)
    }

    async fn execute(&self, key: &str, query_id: u64) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/query/{}/execute", self.base_url, query_id))
            .header("X-DUNE-API-KEY", key)
            .json(&json!({ "performance": "large" }))
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        let body: ExecuteResponse = ensure_success(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::decode(PROVIDER))?;
        Ok(body.execution_id)
    }

    async fn wait_for_completion(
        &self,
        key: &str,
        execution_id: &str,
    ) -> Result<(), ProviderError> {
        for attempt in 1..=self.poll_attempts {
            let status = self.status(key, execution_id).await?;
            match status.state.as_str() {
                STATE_COMPLETED => return Ok(()),
                STATE_FAILED => {
                    let message = status
                        .error
                        .and_then(|e| e.message)
                        .unwrap_or_else(|| "unknown error".to_string());
                    return Err(ProviderError::QueryFailed(message));
                }
                state => tracing::debug!(
                    "Dune execution {} is {} (attempt {})",
                    execution_id,
                    state,
                    attempt
                ),
            }

            if attempt < self.poll_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Err(ProviderError::Timeout(self.poll_attempts))
    }

    async fn status(&self, key: &str, execution_id: &str) -> Result<StatusResponse, ProviderError> {
        let response = self
            .client
            .get(format!("{}/execution/{}/status", self.base_url, execution_id))
            .header("X-DUNE-API-KEY", key)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        ensure_success(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::decode(PROVIDER))
    }

    async fn results(&self, key: &str, execution_id: &str) -> Result<Vec<WhaleRow>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/execution/{}/results", self.base_url, execution_id))
            .header("X-DUNE-API-KEY", key)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        let body: ResultsResponse = ensure_success(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::decode(PROVIDER))?;
        Ok(body.result.map(|r| r.rows).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, attempts: u32) -> DuneClient {
        DuneClient::new(&server.uri(), Some("dune-key".into()))
            .unwrap()
            .with_polling(attempts, Duration::from_millis(5))
    }

    async fn mount_execute(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/query/42/execute"))
            .and(header("X-DUNE-API-KEY", "dune-key"))
            .and(body_json(json!({ "performance": "large" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "execution_id": "01HX", "state": "QUERY_STATE_PENDING"
            })))
            .mount(server)
            .await;
    }

    fn status(state: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "execution_id": "01HX", "state": state }))
    }

    #[tokio::test]
    async fn polls_until_completed_then_fetches_rows() {
        let server = MockServer::start().await;
        mount_execute(&server).await;

        Mock::given(method("GET"))
            .and(path("/execution/01HX/status"))
            .respond_with(status("QUERY_STATE_EXECUTING"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/execution/01HX/status"))
            .respond_with(status(STATE_COMPLETED))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/execution/01HX/results"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "rows": [{
                    "date": "2024-05-01 00:00:00.000 UTC",
                    "whale_to_exchange": 120.5,
                    "exchange_to_whale": 80.0,
                    "net_whale_selling": 40.5,
                    "whale_exchange_tx_count": 12,
                    "market_sentiment": "Bearish"
                }, {
                    "date": null,
                    "whale_to_exchange": 1.0
                }] }
            })))
            .mount(&server)
            .await;

        let rows = client(&server, 5).run_query(42).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].clone().into_flow().is_none());

        let flow = rows[0].clone().into_flow().unwrap();
        assert_eq!(flow.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(flow.whale_exchange_tx_count, Some(12.0));
        assert_eq!(flow.market_sentiment.as_deref(), Some("Bearish"));
    }

    #[tokio::test]
    async fn failed_state_is_reported() {
        let server = MockServer::start().await;
        mount_execute(&server).await;
        Mock::given(method("GET"))
            .and(path("/execution/01HX/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "state": STATE_FAILED, "error": { "message": "out of credits" }
            })))
            .mount(&server)
            .await;

        let err = client(&server, 5).run_query(42).await.unwrap_err();
        assert!(matches!(err, ProviderError::QueryFailed(ref m) if m == "out of credits"));
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let server = MockServer::start().await;
        mount_execute(&server).await;
        Mock::given(method("GET"))
            .and(path("/execution/01HX/status"))
            .respond_with(status("QUERY_STATE_EXECUTING"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server, 3).run_query(42).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(3)));
    }

    #[tokio::test]
    async fn empty_result_is_an_error() {
        let server = MockServer::start().await;
        mount_execute(&server).await;
        Mock::given(method("GET"))
            .and(path("/execution/01HX/status"))
            .respond_with(status(STATE_COMPLETED))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/execution/01HX/results"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "result": { "rows": [] } })),
            )
            .mount(&server)
            .await;

        let err = client(&server, 3).run_query(42).await.unwrap_err();
        assert!(err.to_string().contains("No data received from Dune."));
    }

    #[test]
    fn bad_dates_are_skipped() {
        let row = WhaleRow {
            date: Some("yesterday".into()),
            whale_to_exchange: None,
            exchange_to_whale: None,
            net_whale_selling: None,
            whale_exchange_tx_count: None,
            market_sentiment: None,
        };
        assert!(row.clone().into_flow().is_none());

        let undated = WhaleRow { date: None, ..row };
        assert!(undated.into_flow().is_none());
    }
}
