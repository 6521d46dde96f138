use chrono::Utc;
use sqlx::PgPool;

use super::{RunSummary, ServiceError};
use crate::database::models::WhaleFlow;
use crate::database::MarketRepository;
use crate::providers::{DuneClient, SantimentClient};

/// Stores one Santiment snapshot for `asset`
pub async fn ingest_market_data(
    pool: &PgPool,
    client: &SantimentClient,
    asset: &str,
) -> Result<RunSummary, ServiceError> {
    let snapshot = client.snapshot(asset).await?;
    MarketRepository::new(pool.clone()).upsert_snapshot(&snapshot).await?;

    tracing::info!("Stored market snapshot for {} at {}", asset, snapshot.timestamp);
    Ok(RunSummary::new(1, format!("Successfully synced market data for {}.", asset)))
}

/// Runs the whale-flow query and upserts one row per day
pub async fn ingest_dune(
    pool: &PgPool,
    client: &DuneClient,
    query_id: u64,
) -> Result<RunSummary, ServiceError> {
    let rows = client.run_query(query_id).await?;
    let total = rows.len();
    let flows: Vec<WhaleFlow> = rows.into_iter().filter_map(|r| r.into_flow()).collect();
    if flows.len() < total {
        tracing::warn!("Dropped {} Dune rows without a usable date", total - flows.len());
    }

    let stored = MarketRepository::new(pool.clone()).upsert_whale_flows(&flows, Utc::now()).await?;
    tracing::info!("Stored {} whale flow rows from Dune query {}", stored, query_id);
    Ok(RunSummary::new(
        flows.len() as u64,
        format!("Successfully synced {} data points from Dune.", flows.len()),
    ))
}
