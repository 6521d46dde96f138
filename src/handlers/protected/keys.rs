// handlers/protected/keys.rs - POST /api/keys handler

use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::database::models::NewApiKey;
use crate::database::CredentialRepository;
use crate::error::ApiError;
use crate::handlers::{required, JsonBody};
use crate::middleware::response::Message;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ServiceError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveKeyRequest {
    pub exchange: Option<String>,
    pub label: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

/// Encrypts and stores exchange credentials for the caller
pub async fn keys_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<SaveKeyRequest>,
) -> ApiResult<Message> {
    let (exchange, api_key, api_secret) =
        match (required(&body.exchange), required(&body.api_key), required(&body.api_secret)) {
            (Some(exchange), Some(key), Some(secret)) => (exchange, key, secret),
            (exchange, key, secret) => {
                let fields = [("exchange", exchange), ("apiKey", key), ("apiSecret", secret)];
                let missing: Vec<&str> = fields
                    .into_iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| name)
                    .collect();
                return Err(ApiError::missing_fields(&missing));
            }
        };

    let cipher = state.cipher().ok_or(ServiceError::NotConfigured("API_ENCRYPTION_KEY"))?;

    let key = NewApiKey {
        user_id: user.user_id,
        exchange: exchange.to_string(),
        label: required(&body.label).map(String::from),
        api_key_encrypted: cipher.encrypt(api_key)?,
        api_secret_encrypted: cipher.encrypt(api_secret)?,
    };
    CredentialRepository::new(state.pool.clone()).insert(&key).await?;

    tracing::info!("Stored {} API key for user {}", key.exchange, user.user_id);
    Ok(ApiResponse::<Message>::message("API key saved successfully"))
}
