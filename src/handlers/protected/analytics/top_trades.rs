// handlers/protected/analytics/top_trades.rs - POST /api/analytics/top-trades

use axum::{extract::State, Extension};
use serde::Deserialize;

use super::load_outcomes;
use crate::analytics::top_trades::TOP_TRADES_LIMIT;
use crate::analytics::{TopTrades, TradePnl};
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ExchangeRateService;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTradesRequest {
    pub target_currency: Option<String>,
}

/// Best and worst trades, optionally converted from USD
pub async fn top_trades_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<TopTradesRequest>,
) -> ApiResult<TopTrades> {
    let outcomes = load_outcomes(&state, user.user_id, Default::default()).await?;

    let factor = ExchangeRateService::new(
        state.pool.clone(),
        state.rates.as_ref(),
        state.settings.exchange_rate_ttl,
    )
    .conversion_factor(body.target_currency.as_deref())
    .await;

    let trades = outcomes
        .into_iter()
        .map(|(trade, pnl)| TradePnl {
            symbol: trade.symbol,
            pnl: pnl * factor,
        })
        .collect();

    Ok(ApiResponse::success(TopTrades::rank(trades, TOP_TRADES_LIMIT)))
}
