// handlers/public/exchange_rate.rs - GET /api/exchange-rate handler

use axum::extract::State;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ExchangeRateService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub rate: f64,
}

/// USD→VND rate, served from the cache while it is fresh
pub async fn exchange_rate_get(State(state): State<AppState>) -> ApiResult<RateResponse> {
    let service = ExchangeRateService::new(
        state.pool.clone(),
        state.rates.as_ref(),
        state.settings.exchange_rate_ttl,
    );
    let rate = service.usd_to_vnd().await?;
    Ok(ApiResponse::success(RateResponse { rate }))
}
