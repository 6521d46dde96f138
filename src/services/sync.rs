use sqlx::PgPool;
use uuid::Uuid;

use super::{RunSummary, ServiceError};
use crate::crypto::CredentialCipher;
use crate::database::models::NewTrade;
use crate::database::{CredentialRepository, TradeRepository, TradeSource};
use crate::providers::{BinanceClient, BinanceCredentials, CovalentClient};

pub const BINANCE: &str = "Binance";

/// Pulls fills for every symbol the user has journaled and upserts them.
/// A symbol that fails to fetch or store is logged and skipped.
pub async fn sync_binance(
    pool: &PgPool,
    cipher: Option<&CredentialCipher>,
    client: &BinanceClient,
    user_id: Uuid,
) -> Result<RunSummary, ServiceError> {
    let stored = CredentialRepository::new(pool.clone())
        .find(user_id, BINANCE)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound("No Binance API key found for this user.".to_string())
        })?;

    let cipher = cipher.ok_or(ServiceError::NotConfigured("API_ENCRYPTION_KEY"))?;
    let credentials = BinanceCredentials {
        api_key: cipher.decrypt(&stored.api_key_encrypted)?,
        api_secret: cipher.decrypt(&stored.api_secret_encrypted)?,
    };

    let trades = TradeRepository::new(pool.clone());
    let symbols = trades.distinct_symbols(user_id).await?;
    if symbols.is_empty() {
        return Ok(RunSummary::new(0, "No symbols to sync."));
    }

    let mut processed = 0;
    for symbol in &symbols {
        let fills = match client.my_trades(&credentials, symbol).await {
            Ok(fills) => fills,
            Err(e) => {
                tracing::error!("Error fetching Binance trades for {}: {}", symbol, e);
                continue;
            }
        };

        let batch: Vec<NewTrade> =
            fills.into_iter().filter_map(|f| f.into_trade(user_id)).collect();
        if batch.is_empty() {
            continue;
        }

        match trades.upsert(&batch, TradeSource::Exchange).await {
            Ok(rows) => processed += rows,
            Err(e) => tracing::error!("Error storing Binance trades for {}: {}", symbol, e),
        }
    }

    tracing::info!(
        "Binance sync for user {} processed {} trades over {} symbols",
        user_id,
        processed,
        symbols.len()
    );
    Ok(RunSummary::new(
        processed,
        format!("Sync completed. {} trades processed.", processed),
    ))
}

/// Decodes the wallet's recent BNB Smart Chain transactions into trades
pub async fn sync_onchain(
    pool: &PgPool,
    client: &CovalentClient,
    user_id: Uuid,
    wallet: &str,
) -> Result<RunSummary, ServiceError> {
    let transactions = client.transactions(wallet).await?;
    if transactions.is_empty() {
        return Ok(RunSummary::new(0, "No transactions found for this address."));
    }

    let batch: Vec<NewTrade> = transactions
        .iter()
        .filter_map(|tx| tx.decode(wallet, user_id))
        .collect();
    if batch.is_empty() {
        return Ok(RunSummary::new(0, "No new supported transactions found."));
    }

    let processed = TradeRepository::new(pool.clone()).upsert(&batch, TradeSource::Chain).await?;
    tracing::info!(
        "On-chain sync for user {} processed {} of {} transactions",
        user_id,
        processed,
        transactions.len()
    );
    Ok(RunSummary::new(
        processed,
        format!("Sync completed. {} new transactions processed.", processed),
    ))
}
