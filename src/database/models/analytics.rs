use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of `trade_analytics`. Rows without a PnL are filtered out in SQL.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct AnalyticsRow {
    pub pnl: f64,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: Option<i32>,
    pub mindset_rating: Option<i32>,
    pub emotion_tags: Option<Vec<String>>,
    pub trading_session: Option<String>,
    pub strategy: Option<String>,
}
