// handlers/protected/analytics/user_stats.rs - POST /api/analytics/user-stats

use axum::{extract::State, Extension};

use super::{load_outcomes, TimeRangeRequest};
use crate::analytics::{TimeRange, UserStats};
use crate::database::TradeFilter;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

pub async fn user_stats_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<TimeRangeRequest>,
) -> ApiResult<UserStats> {
    let filter = TradeFilter {
        since: TimeRange::parse(body.time_range.as_deref()).start(chrono::Utc::now()),
        ..Default::default()
    };

    let outcomes = load_outcomes(&state, user.user_id, filter).await?;
    let stats = UserStats::from_outcomes(
        outcomes.into_iter().map(|(trade, pnl)| (trade.created_at, pnl)),
    );
    Ok(ApiResponse::success(stats))
}
