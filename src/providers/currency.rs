use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

use super::{ensure_success, http_client, ProviderError};

const PROVIDER: &str = "CurrencyFreaks";

/// Source of live conversion rates
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Units of `target` per one unit of `base`
    async fn latest_rate(&self, base: &str, target: &str) -> Result<f64, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, Value>,
}

/// Rates arrive as strings (`"25345.5"`); numbers are accepted too.
fn parse_rate(rates: &HashMap<String, Value>, code: &str) -> Option<f64> {
    let rate = match rates.get(code)? {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    (rate.is_finite() && rate != 0.0).then_some(rate)
}

#[derive(Debug, Clone)]
pub struct CurrencyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CurrencyClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl RateSource for CurrencyClient {
    async fn latest_rate(&self, base: &str, target: &str) -> Result<f64, ProviderError> {
        let key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey(PROVIDER))?;

        let mut url = Url::parse(&format!("{}/v2.0/rates/latest", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("apikey", key)
            .append_pair("symbols", &format!("{},{}", target, base));

        let response = self.client.get(url).send().await.map_err(ProviderError::http(PROVIDER))?;
        let body: LatestRates = ensure_success(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::decode(PROVIDER))?;

        let target_rate = parse_rate(&body.rates, target).ok_or_else(|| {
            ProviderError::invalid(PROVIDER, format!("no usable {} rate", target))
        })?;
        // Quotes are against USD; rebase when another base is asked for
        let base_rate = if base.eq_ignore_ascii_case("USD") {
            1.0
        } else {
            parse_rate(&body.rates, base).ok_or_else(|| {
                ProviderError::invalid(PROVIDER, format!("no usable {} rate", base))
            })?
        };

        Ok(target_rate / base_rate)
    }
}
