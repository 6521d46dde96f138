// handlers/protected/sync/onchain.rs - POST /api/sync/onchain handler

use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::{required, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{sync_onchain, RunSummary};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnchainRequest {
    pub wallet_address: Option<String>,
    pub blockchain: Option<String>,
}

/// Imports swaps and transfers for a wallet. Only BNB Smart Chain is
/// indexed, whatever `blockchain` names.
pub async fn onchain_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<OnchainRequest>,
) -> ApiResult<RunSummary> {
    let (wallet, blockchain) = match (required(&body.wallet_address), required(&body.blockchain)) {
        (Some(wallet), Some(chain)) => (wallet, chain),
        (None, Some(_)) => return Err(ApiError::missing_fields(&["walletAddress"])),
        (Some(_), None) => return Err(ApiError::missing_fields(&["blockchain"])),
        (None, None) => return Err(ApiError::missing_fields(&["walletAddress", "blockchain"])),
    };

    tracing::info!("On-chain sync requested for {} on {}", wallet, blockchain);
    let summary = sync_onchain(&state.pool, &state.providers.covalent, user.user_id, wallet).await?;
    Ok(ApiResponse::success(summary))
}
