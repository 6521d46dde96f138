// handlers/protected/analytics/market_correlation.rs - POST /api/analytics/market-correlation

use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::{required, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{market_correlation, MarketCorrelation};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CorrelationRequest {
    pub trade_id: Option<String>,
}

pub async fn market_correlation_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CorrelationRequest>,
) -> ApiResult<MarketCorrelation> {
    let trade_id =
        required(&body.trade_id).ok_or_else(|| ApiError::missing_fields(&["trade_id"]))?;
    let trade_id = Uuid::parse_str(trade_id)
        .map_err(|_| ApiError::bad_request("trade_id must be a valid UUID"))?;

    let correlation = market_correlation(&state.pool, user.user_id, trade_id).await?;
    Ok(ApiResponse::success(correlation))
}
