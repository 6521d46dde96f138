pub mod correlation;
pub mod exchange_rate;
pub mod ingest;
pub mod sync;

use serde::Serialize;
use thiserror::Error;

use crate::crypto::CryptoError;
use crate::database::DatabaseError;
use crate::providers::ProviderError;

pub use correlation::{market_correlation, MarketCorrelation};
pub use exchange_rate::ExchangeRateService;
pub use ingest::{ingest_dune, ingest_market_data};
pub use sync::{sync_binance, sync_onchain};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Result of a sync or ingest run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub processed: u64,
    pub message: String,
}

impl RunSummary {
    pub fn new(processed: u64, message: impl Into<String>) -> Self {
        Self {
            processed,
            message: message.into(),
        }
    }
}
