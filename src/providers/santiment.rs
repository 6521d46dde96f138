use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{ensure_success, http_client, ProviderError};
use crate::database::models::MarketSnapshot;

const PROVIDER: &str = "Santiment";

/// (response alias, Santiment metric name)
const METRICS: [(&str, &str); 10] = [
    ("top_holders", "top_holders_percent_of_total_supply"),
    ("exchange_inflow", "exchange_inflow"),
    ("exchange_outflow", "exchange_outflow"),
    ("active_addresses_24h", "active_addresses_24h"),
    ("token_age_consumed", "token_age_consumed"),
    ("velocity", "velocity"),
    ("age_destroyed", "age_destroyed"),
    ("social_volume", "social_volume_total"),
    ("sentiment_balance", "sentiment_balance_total"),
    ("social_dominance", "social_dominance_total"),
];

/// One aliased `getMetric` per metric, each asking for the latest hourly
/// value over the last two hours.
pub fn build_query(asset: &str) -> String {
    let fields: Vec<String> = METRICS
        .iter()
        .map(|(alias, metric)| {
            format!(
                "  {alias}: getMetric(metric: \"{metric}\") {{\n    \
                 latest: timeseriesData(slug: \"{asset}\", \
                 from: \"utc_now-2h\", to: \"utc_now\", interval: \"1h\", limit: 1) \
                 {{ value }}\n  }}"
            )
        })
        .collect();
    format!("query {{\n{}\n}}", fields.join("\n"))
}

fn latest_value(data: &Value, alias: &str) -> Option<f64> {
    data.get(alias)?.get("latest")?.get(0)?.get("value")?.as_f64()
}

/// Snapshot from a GraphQL response body; absent metrics stay `None`
pub fn snapshot_from_response(
    body: &Value,
    asset: &str,
    timestamp: DateTime<Utc>,
) -> MarketSnapshot {
    if let Some(errors) = body.get("errors") {
        tracing::warn!("Santiment returned errors: {}", errors);
    }
    let data = body.get("data").unwrap_or(&Value::Null);
    let value = |alias: &str| latest_value(data, alias);

    MarketSnapshot {
        timestamp,
        asset: asset.to_string(),
        top_holders_percent_of_total_supply: value("top_holders"),
        exchange_inflow: value("exchange_inflow"),
        exchange_outflow: value("exchange_outflow"),
        active_addresses_24h: value("active_addresses_24h"),
        token_age_consumed: value("token_age_consumed"),
        velocity: value("velocity"),
        age_destroyed: value("age_destroyed"),
        social_volume: value("social_volume"),
        sentiment_balance: value("sentiment_balance"),
        social_dominance: value("social_dominance"),
    }
}

#[derive(Debug, Clone)]
pub struct SantimentClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl SantimentClient {
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            url: url.to_string(),
            api_key,
        })
    }

    pub async fn snapshot(&self, asset: &str) -> Result<MarketSnapshot, ProviderError> {
        let key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey(PROVIDER))?;

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/graphql")
            .header(reqwest::header::AUTHORIZATION, format!("Apikey {}", key))
            .body(build_query(asset))
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        let body: Value = ensure_success(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::decode(PROVIDER))?;

        Ok(snapshot_from_response(&body, asset, Utc::now()))
    }
}
