use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::MarketSnapshot;
use crate::database::{DatabaseError, MarketRepository, TradeRepository};

pub const NO_SNAPSHOT: &str = "No market data snapshot found for this time.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCorrelation {
    pub market_context: Option<MarketSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl From<Option<MarketSnapshot>> for MarketCorrelation {
    fn from(snapshot: Option<MarketSnapshot>) -> Self {
        match snapshot {
            Some(snapshot) => Self {
                market_context: Some(snapshot),
                message: None,
            },
            None => Self {
                market_context: None,
                message: Some(NO_SNAPSHOT),
            },
        }
    }
}

/// Market snapshot in effect when the user's trade was opened
pub async fn market_correlation(
    pool: &PgPool,
    user_id: Uuid,
    trade_id: Uuid,
) -> Result<MarketCorrelation, ServiceError> {
    let trade = TradeRepository::new(pool.clone())
        .context(user_id, trade_id)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound(_) => ServiceError::NotFound("Trade not found".to_string()),
            other => other.into(),
        })?;

    let snapshot = MarketRepository::new(pool.clone())
        .snapshot_before(&trade.asset(), trade.created_at)
        .await?;
    Ok(snapshot.into())
}
