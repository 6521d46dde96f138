// handlers/protected/sync/binance.rs - POST /api/sync/binance handler

use axum::{extract::State, Extension};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{sync_binance, RunSummary};
use crate::state::AppState;

pub async fn binance_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<RunSummary> {
    let summary = sync_binance(
        &state.pool,
        state.cipher(),
        &state.providers.binance,
        user.user_id,
    )
    .await?;
    Ok(ApiResponse::success(summary))
}
