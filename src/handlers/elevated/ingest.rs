// handlers/elevated/ingest.rs - POST /api/ingest/market-data and /api/ingest/dune

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ingest_dune, ingest_market_data, RunSummary};
use crate::state::AppState;

pub async fn market_data_post(State(state): State<AppState>) -> ApiResult<RunSummary> {
    let summary = ingest_market_data(
        &state.pool,
        &state.providers.santiment,
        &state.settings.santiment_asset,
    )
    .await?;
    Ok(ApiResponse::success(summary))
}

pub async fn dune_post(State(state): State<AppState>) -> ApiResult<RunSummary> {
    let summary =
        ingest_dune(&state.pool, &state.providers.dune, state.settings.dune_query_id).await?;
    Ok(ApiResponse::success(summary))
}
