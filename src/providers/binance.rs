use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use url::Url;
use uuid::Uuid;

use super::{ensure_success, http_client, ProviderError};
use crate::analytics::Direction;
use crate::database::models::NewTrade;

type HmacSha256 = Hmac<Sha256>;

const PROVIDER: &str = "Binance";

/// Decrypted API key pair for one user
#[derive(Clone)]
pub struct BinanceCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for BinanceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BinanceCredentials { .. }")
    }
}

/// One fill from `GET /api/v3/myTrades`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceFill {
    pub id: u64,
    pub symbol: String,
    pub price: String,
    pub qty: String,
    pub commission: String,
    pub commission_asset: String,
    pub time: i64,
    pub is_buyer: bool,
}

impl BinanceFill {
    /// Journal entry for the fill. Fills with unparseable numbers or
    /// timestamps are dropped.
    pub fn into_trade(self, user_id: Uuid) -> Option<NewTrade> {
        let (Ok(price), Ok(quantity)) = (self.price.parse::<f64>(), self.qty.parse::<f64>()) else {
            tracing::warn!(
                "Skipping Binance fill {} with price={:?} qty={:?}",
                self.id,
                self.price,
                self.qty
            );
            return None;
        };
        let Some(created_at) = DateTime::<Utc>::from_timestamp_millis(self.time) else {
            tracing::warn!("Skipping Binance fill {} with time={}", self.id, self.time);
            return None;
        };

        Some(NewTrade {
            user_id,
            notes: format!(
                "Synced from Binance. Commission: {} {}",
                self.commission, self.commission_asset
            ),
            symbol: self.symbol,
            direction: if self.is_buyer { Direction::Long } else { Direction::Short },
            entry_price: price,
            exit_price: price,
            quantity,
            exchange_trade_id: Some(self.id.to_string()),
            tx_hash: None,
            created_at,
        })
    }
}

/// Hex HMAC-SHA256 of `query` under the account secret
pub fn sign_query(secret: &str, query: &str) -> Result<String, ProviderError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ProviderError::invalid(PROVIDER, "API secret cannot be used as an HMAC key"))?;
    mac.update(query.as_bytes());
    let signature = mac.finalize().into_bytes();
    Ok(hex::encode(signature))
}

/// Exchange symbol for a journal symbol: `BTC/USDT` -> `BTCUSDT`
pub fn exchange_symbol(symbol: &str) -> String {
    symbol.chars().filter(|c| *c != '/').collect::<String>().to_uppercase()
}

#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn my_trades(
        &self,
        credentials: &BinanceCredentials,
        symbol: &str,
    ) -> Result<Vec<BinanceFill>, ProviderError> {
        let timestamp = Utc::now().timestamp_millis();
        let query = format!("symbol={}&timestamp={}", exchange_symbol(symbol), timestamp);
        let signature = sign_query(&credentials.api_secret, &query)?;

        let mut url = Url::parse(&format!("{}/api/v3/myTrades", self.base_url))?;
        url.set_query(Some(&format!("{}&signature={}", query, signature)));

        let response = self
            .client
            .get(url)
            .header("X-MBX-APIKEY", &credentials.api_key)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        ensure_success(PROVIDER, response)
            .await?
            .json::<Vec<BinanceFill>>()
            .await
            .map_err(ProviderError::decode(PROVIDER))
    }
}
