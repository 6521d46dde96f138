// handlers/protected/analytics/performance_charts.rs - POST /api/analytics/performance-charts

use axum::{extract::State, Extension};

use super::TimeRangeRequest;
use crate::analytics::patterns::{strategy_performance, StrategyPnl};
use crate::analytics::pnl::valid_outcome;
use crate::analytics::TimeRange;
use crate::database::{TradeFilter, TradeRepository};
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Cumulative PnL per strategy for trades opened inside the requested range
pub async fn performance_charts_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<TimeRangeRequest>,
) -> ApiResult<Vec<StrategyPnl>> {
    let range = TimeRange::parse(body.time_range.as_deref());
    let filter = TradeFilter {
        since: range.start(chrono::Utc::now()),
        require_strategy: true,
    };

    let trades = TradeRepository::new(state.pool.clone())
        .closed_trades(user.user_id, filter)
        .await?
        .into_iter()
        .filter(|t| valid_outcome(t.pnl(), "trade").is_some())
        .collect::<Vec<_>>();

    tracing::debug!(
        "Performance charts for user {}: {} trades in range {:?}",
        user.user_id,
        trades.len(),
        range
    );
    Ok(ApiResponse::success(strategy_performance(&trades)))
}
