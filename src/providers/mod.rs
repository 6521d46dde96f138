//! HTTP clients for the exchanges and data vendors the journal talks to.

pub mod binance;
pub mod covalent;
pub mod currency;
pub mod dune;
pub mod santiment;

use std::time::Duration;

use thiserror::Error;

use crate::config::ProviderConfig;

pub use binance::{BinanceClient, BinanceCredentials, BinanceFill};
pub use covalent::{ChainTransaction, CovalentClient};
pub use currency::{CurrencyClient, RateSource};
pub use dune::DuneClient;
pub use santiment::SantimentClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} API key is not configured")]
    MissingApiKey(&'static str),

    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: &'static str, reason: String },

    #[error("Dune query execution failed: {0}")]
    QueryFailed(String),

    #[error("Dune query timed out after {0} attempts")]
    Timeout(u32),

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ProviderError {
    /// Request URLs can carry API keys in the query string, so they are
    /// stripped before the error is stored.
    fn http(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::Http {
            provider,
            source: source.without_url(),
        }
    }

    fn decode(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::invalid(provider, source.without_url().to_string())
    }

    /// Upstream the error came from, when it is tied to one
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            ProviderError::MissingApiKey(provider)
            | ProviderError::Http { provider, .. }
            | ProviderError::Upstream { provider, .. }
            | ProviderError::InvalidResponse { provider, .. } => Some(provider),
            ProviderError::QueryFailed(_) | ProviderError::Timeout(_) => Some("Dune"),
            ProviderError::InvalidUrl(_) => None,
        }
    }

    fn invalid(provider: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::InvalidResponse {
            provider,
            reason: reason.into(),
        }
    }
}

fn http_client(provider: &'static str) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("trading-journal-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::http(provider))
}

/// Passes 2xx responses through; anything else becomes `Upstream` with the body text
async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Upstream {
        provider,
        status: status.as_u16(),
        body,
    })
}

/// One client per upstream, shared through application state
#[derive(Debug, Clone)]
pub struct Providers {
    pub binance: BinanceClient,
    pub covalent: CovalentClient,
    pub dune: DuneClient,
    pub santiment: SantimentClient,
    pub currency: CurrencyClient,
}

impl Providers {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let dune = DuneClient::new(&config.dune_base_url, config.dune_api_key.clone())?;
        Ok(Self {
            binance: BinanceClient::new(&config.binance_base_url)?,
            covalent: CovalentClient::new(
                &config.covalent_base_url,
                config.covalent_api_key.clone(),
            )?,
            dune: dune.with_polling(
                config.dune_poll_attempts,
                Duration::from_secs(config.dune_poll_interval_secs),
            ),
            santiment: SantimentClient::new(
                &config.santiment_url,
                config.santiment_api_key.clone(),
            )?,
            currency: CurrencyClient::new(
                &config.currency_base_url,
                config.currency_api_key.clone(),
            )?,
        })
    }
}
