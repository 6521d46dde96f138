use sqlx::FromRow;
use uuid::Uuid;

/// Encrypted exchange credentials as stored in `user_api_keys`
#[derive(Debug, Clone, FromRow)]
pub struct StoredApiKey {
    pub api_key_encrypted: String,
    pub api_secret_encrypted: String,
}

#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub user_id: Uuid,
    pub exchange: String,
    pub label: Option<String>,
    pub api_key_encrypted: String,
    pub api_secret_encrypted: String,
}
