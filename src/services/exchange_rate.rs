use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use super::ServiceError;
use crate::database::models::CachedRate;
use crate::database::{DatabaseError, MarketRepository};
use crate::providers::RateSource;

pub const BASE_CURRENCY: &str = "USD";
pub const VND: &str = "VND";

/// Storage for the last fetched rate per currency pair
#[async_trait]
pub trait RateCache: Send + Sync {
    async fn cached_rate(
        &self,
        base: &str,
        target: &str,
    ) -> Result<Option<CachedRate>, DatabaseError>;

    async fn store_rate(
        &self,
        base: &str,
        target: &str,
        rate: f64,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;
}

#[async_trait]
impl RateCache for MarketRepository {
    async fn cached_rate(
        &self,
        base: &str,
        target: &str,
    ) -> Result<Option<CachedRate>, DatabaseError> {
        MarketRepository::cached_rate(self, base, target).await
    }

    async fn store_rate(
        &self,
        base: &str,
        target: &str,
        rate: f64,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        MarketRepository::store_rate(self, base, target, rate, at).await
    }
}

/// Cached USD conversion rates backed by `exchange_rate_cache`
pub struct ExchangeRateService<'a> {
    cache: Box<dyn RateCache + 'a>,
    source: &'a dyn RateSource,
    ttl: Duration,
}

/// The cached rate, if it was refreshed less than `ttl` ago
pub fn fresh_rate(cached: Option<&CachedRate>, now: DateTime<Utc>, ttl: Duration) -> Option<f64> {
    cached.filter(|c| now - c.last_updated < ttl).map(|c| c.conversion_rate)
}

impl<'a> ExchangeRateService<'a> {
    pub fn new(pool: PgPool, source: &'a dyn RateSource, ttl: Duration) -> Self {
        Self::with_cache(MarketRepository::new(pool), source, ttl)
    }

    pub fn with_cache(
        cache: impl RateCache + 'a,
        source: &'a dyn RateSource,
        ttl: Duration,
    ) -> Self {
        Self {
            cache: Box::new(cache),
            source,
            ttl,
        }
    }

    pub async fn usd_to_vnd(&self) -> Result<f64, ServiceError> {
        self.rate(BASE_CURRENCY, VND).await
    }

    pub async fn rate(&self, base: &str, target: &str) -> Result<f64, ServiceError> {
        let now = Utc::now();
        let cached = self.cache.cached_rate(base, target).await?;
        if let Some(rate) = fresh_rate(cached.as_ref(), now, self.ttl) {
            tracing::debug!("Using cached {}/{} rate {}", base, target, rate);
            return Ok(rate);
        }

        let rate = self.source.latest_rate(base, target).await?;
        tracing::info!("Fetched {}/{} rate {}", base, target, rate);

        // A failed cache write still returns the fresh rate
        if let Err(e) = self.cache.store_rate(base, target, rate, now).await {
            tracing::error!("Failed to cache {}/{} rate: {}", base, target, e);
        }
        Ok(rate)
    }

    /// Rate used to convert PnL into `target`, or 1.0 when no conversion
    /// applies or the rate cannot be obtained.
    pub async fn conversion_factor(&self, target: Option<&str>) -> f64 {
        match target {
            Some(code) if code.eq_ignore_ascii_case(VND) => match self.usd_to_vnd().await {
                Ok(rate) => rate,
                Err(e) => {
                    tracing::warn!("Exchange rate unavailable, reporting unconverted PnL: {}", e);
                    1.0
                }
            },
            _ => 1.0,
        }
    }
}
