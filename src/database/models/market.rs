use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// On-chain and social metrics for one asset at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    pub top_holders_percent_of_total_supply: Option<f64>,
    pub exchange_inflow: Option<f64>,
    pub exchange_outflow: Option<f64>,
    pub active_addresses_24h: Option<f64>,
    pub token_age_consumed: Option<f64>,
    pub velocity: Option<f64>,
    pub age_destroyed: Option<f64>,
    pub social_volume: Option<f64>,
    pub sentiment_balance: Option<f64>,
    pub social_dominance: Option<f64>,
}

/// Daily whale flow row from the Dune query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhaleFlow {
    pub date: NaiveDate,
    pub whale_to_exchange: Option<f64>,
    pub exchange_to_whale: Option<f64>,
    pub net_whale_selling: Option<f64>,
    pub whale_exchange_tx_count: Option<f64>,
    pub market_sentiment: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CachedRate {
    pub conversion_rate: f64,
    pub last_updated: DateTime<Utc>,
}
