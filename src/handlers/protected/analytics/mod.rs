// handlers/protected/analytics/mod.rs - Analytics report handlers
//
// Route Prefix: /api/analytics/*
// Every report is computed on request from the caller's own trades.

pub mod market_correlation;
pub mod performance_charts;
pub mod performance_patterns;
pub mod psychological_impact;
pub mod top_trades;
pub mod user_stats;
pub mod winning_patterns;

pub use market_correlation::market_correlation_post;
pub use performance_charts::performance_charts_post;
pub use performance_patterns::performance_patterns_post;
pub use psychological_impact::psychological_impact_post;
pub use top_trades::top_trades_post;
pub use user_stats::user_stats_post;
pub use winning_patterns::winning_patterns_post;

use serde::Deserialize;
use uuid::Uuid;

use crate::analytics::pnl::valid_outcome;
use crate::database::models::{AnalyticsRow, ClosedTrade};
use crate::database::{AnalyticsRepository, TradeFilter, TradeRepository};
use crate::error::ApiError;
use crate::state::AppState;

/// Body for reports scoped to a time range
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeRequest {
    pub time_range: Option<String>,
}

/// Analytics rows with a usable PnL
async fn load_rows(state: &AppState, user_id: Uuid) -> Result<Vec<AnalyticsRow>, ApiError> {
    let rows = AnalyticsRepository::new(state.pool.clone()).rows(user_id).await?;
    Ok(rows
        .into_iter()
        .filter(|row| valid_outcome(row.pnl, "analytics row").is_some())
        .collect())
}

/// Closed trades paired with their PnL, in `created_at` order
async fn load_outcomes(
    state: &AppState,
    user_id: Uuid,
    filter: TradeFilter,
) -> Result<Vec<(ClosedTrade, f64)>, ApiError> {
    let trades = TradeRepository::new(state.pool.clone()).closed_trades(user_id, filter).await?;
    Ok(trades
        .into_iter()
        .filter_map(|trade| {
            let pnl = valid_outcome(trade.pnl(), "trade")?;
            Some((trade, pnl))
        })
        .collect())
}
