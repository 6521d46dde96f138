use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::crypto::CredentialCipher;
use crate::database::DatabaseManager;
use crate::middleware::RateLimiter;
use crate::providers::{Providers, RateSource};

/// Per-deployment values handlers need besides the shared clients
#[derive(Debug, Clone)]
pub struct Settings {
    pub exchange_rate_ttl: chrono::Duration,
    pub dune_query_id: u64,
    pub santiment_asset: String,
}

/// Shared handles injected into every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub verifier: Arc<TokenVerifier>,
    pub cipher: Option<Arc<CredentialCipher>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub providers: Arc<Providers>,
    pub rates: Arc<dyn RateSource>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let pool = DatabaseManager::connect(&config.database)
            .context("failed to configure database pool")?;

        let verifier = TokenVerifier::new(
            &config.security.jwt_secret,
            config.security.jwt_audience.as_deref(),
        )
        .context("JWT_SECRET must be set")?;

        // An unusable key is fatal; a missing one only disables the credential endpoints
        let cipher = match config.security.encryption_key.as_deref() {
            Some(key) => {
                let cipher = CredentialCipher::from_key(key).context("invalid API_ENCRYPTION_KEY")?;
                Some(Arc::new(cipher))
            }
            None => {
                tracing::warn!(
                    "API_ENCRYPTION_KEY not set; API key storage and Binance sync are disabled"
                );
                None
            }
        };

        let providers = Providers::from_config(&config.providers)
            .context("failed to build provider clients")?;
        let rates: Arc<dyn RateSource> = Arc::new(providers.currency.clone());

        Ok(Self {
            pool,
            verifier: Arc::new(verifier),
            cipher,
            rate_limiter: Arc::new(RateLimiter::from_config(&config.api)),
            providers: Arc::new(providers),
            rates,
            settings: Arc::new(Settings {
                exchange_rate_ttl: chrono::Duration::hours(config.cache.exchange_rate_ttl_hours),
                dune_query_id: config.providers.dune_query_id,
                santiment_asset: config.providers.santiment_asset.clone(),
            }),
        })
    }

    pub fn cipher(&self) -> Option<&CredentialCipher> {
        self.cipher.as_deref()
    }
}
