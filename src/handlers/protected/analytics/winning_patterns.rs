// handlers/protected/analytics/winning_patterns.rs - POST /api/analytics/winning-patterns

use axum::{extract::State, Extension};

use super::load_rows;
use crate::analytics::patterns::{winning_patterns, Report, WinningPatterns};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

pub async fn winning_patterns_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Report<WinningPatterns>> {
    let rows = load_rows(&state, user.user_id).await?;
    Ok(ApiResponse::success(Report::from_rows(&rows, winning_patterns)))
}
