use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::analytics::pnl::{trade_pnl, Direction};

/// A trade with an exit price, read for PnL reporting
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClosedTrade {
    pub symbol: String,
    pub strategy: Option<String>,
    pub direction: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub created_at: DateTime<Utc>,
}

impl ClosedTrade {
    pub fn pnl(&self) -> f64 {
        trade_pnl(
            self.entry_price,
            self.exit_price,
            self.quantity,
            Direction::parse(&self.direction),
        )
    }
}

/// Timestamp and symbol of a single trade, used to look up market context
#[derive(Debug, Clone, FromRow)]
pub struct TradeContext {
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}

impl TradeContext {
    /// Asset slug for market snapshots: `BTC/USDT` -> `btc`
    pub fn asset(&self) -> String {
        self.symbol.split('/').next().unwrap_or_default().to_lowercase()
    }
}

/// Trade imported from an exchange or decoded from chain data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTrade {
    pub user_id: Uuid,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub notes: String,
    pub exchange_trade_id: Option<String>,
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}
