// handlers/protected/analytics/performance_patterns.rs - POST /api/analytics/performance-patterns

use axum::{extract::State, Extension};

use super::load_rows;
use crate::analytics::patterns::{performance_patterns, PerformancePatterns};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

pub async fn performance_patterns_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<PerformancePatterns> {
    let rows = load_rows(&state, user.user_id).await?;
    Ok(ApiResponse::success(performance_patterns(&rows)))
}
