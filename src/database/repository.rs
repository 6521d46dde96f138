//! Queries against the journal tables.
//!
//! NUMERIC columns are cast to `float8` on the way out so rows decode
//! straight into `f64` fields.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AnalyticsRow, CachedRate, ClosedTrade, MarketSnapshot, NewApiKey, NewTrade, StoredApiKey,
    TradeContext, WhaleFlow,
};

/// Uniqueness constraint an imported trade is deduplicated on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSource {
    /// `(exchange_trade_id, user_id)`
    Exchange,
    /// `(user_id, tx_hash)`
    Chain,
}

impl TradeSource {
    fn conflict_target(self) -> &'static str {
        match self {
            TradeSource::Exchange => "(exchange_trade_id, user_id)",
            TradeSource::Chain => "(user_id, tx_hash)",
        }
    }
}

/// Filters for closed-trade reads
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeFilter {
    pub since: Option<DateTime<Utc>>,
    pub require_strategy: bool,
}

pub struct TradeRepository {
    pool: PgPool,
}

impl TradeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Trades with an exit price, oldest first
    pub async fn closed_trades(
        &self,
        user_id: Uuid,
        filter: TradeFilter,
    ) -> Result<Vec<ClosedTrade>, DatabaseError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT symbol, strategy, direction, entry_price::float8 AS entry_price, \
             exit_price::float8 AS exit_price, quantity::float8 AS quantity, created_at \
             FROM trades WHERE exit_price IS NOT NULL AND user_id = ",
        );
        query.push_bind(user_id);

        if let Some(since) = filter.since {
            query.push(" AND created_at >= ").push_bind(since);
        }
        if filter.require_strategy {
            query.push(" AND strategy IS NOT NULL");
        }
        query.push(" ORDER BY created_at ASC");

        Ok(query.build_query_as::<ClosedTrade>().fetch_all(&self.pool).await?)
    }

    pub async fn distinct_symbols(&self, user_id: Uuid) -> Result<Vec<String>, DatabaseError> {
        let symbols = sqlx::query_scalar(
            "SELECT DISTINCT symbol FROM trades WHERE user_id = $1 ORDER BY symbol",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(symbols)
    }

    pub async fn context(
        &self,
        user_id: Uuid,
        trade_id: Uuid,
    ) -> Result<TradeContext, DatabaseError> {
        sqlx::query_as::<_, TradeContext>(
            "SELECT symbol, created_at FROM trades WHERE id = $1 AND user_id = $2",
        )
        .bind(trade_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Trade not found".to_string()))
    }

    /// Insert or refresh imported trades; returns the number of rows written
    pub async fn upsert(
        &self,
        trades: &[NewTrade],
        source: TradeSource,
    ) -> Result<u64, DatabaseError> {
        if trades.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO trades (user_id, symbol, direction, entry_price, exit_price, quantity, \
             notes, exchange_trade_id, tx_hash, created_at) ",
        );
        query.push_values(trades, |mut row, trade| {
            row.push_bind(trade.user_id)
                .push_bind(&trade.symbol)
                .push_bind(trade.direction.as_str())
                .push_bind(trade.entry_price)
                .push_bind(trade.exit_price)
                .push_bind(trade.quantity)
                .push_bind(&trade.notes)
                .push_bind(&trade.exchange_trade_id)
                .push_bind(&trade.tx_hash)
                .push_bind(trade.created_at);
        });
        query
            .push(" ON CONFLICT ")
            .push(source.conflict_target())
            .push(
                " DO UPDATE SET symbol = EXCLUDED.symbol, direction = EXCLUDED.direction, \
                 entry_price = EXCLUDED.entry_price, exit_price = EXCLUDED.exit_price, \
                 quantity = EXCLUDED.quantity, notes = EXCLUDED.notes, \
                 created_at = EXCLUDED.created_at",
            );

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Analytics rows that carry a PnL value
    pub async fn rows(&self, user_id: Uuid) -> Result<Vec<AnalyticsRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AnalyticsRow>(
            "SELECT pnl::float8 AS pnl, day_of_week, mindset_rating, emotion_tags, \
             trading_session, strategy \
             FROM trade_analytics WHERE user_id = $1 AND pnl IS NOT NULL",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, key: &NewApiKey) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO user_api_keys \
             (user_id, exchange, label, api_key_encrypted, api_secret_encrypted) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(key.user_id)
        .bind(&key.exchange)
        .bind(&key.label)
        .bind(&key.api_key_encrypted)
        .bind(&key.api_secret_encrypted)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recently stored key for the exchange
    pub async fn find(
        &self,
        user_id: Uuid,
        exchange: &str,
    ) -> Result<Option<StoredApiKey>, DatabaseError> {
        let key = sqlx::query_as::<_, StoredApiKey>(
            "SELECT api_key_encrypted, api_secret_encrypted FROM user_api_keys \
             WHERE user_id = $1 AND exchange = $2 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(exchange)
        .fetch_optional(&self.pool)
        .await?;
        Ok(key)
    }
}

const SNAPSHOT_COLUMNS: &str = "timestamp, asset, \
    top_holders_percent_of_total_supply::float8 AS top_holders_percent_of_total_supply, \
    exchange_inflow::float8 AS exchange_inflow, exchange_outflow::float8 AS exchange_outflow, \
    active_addresses_24h::float8 AS active_addresses_24h, \
    token_age_consumed::float8 AS token_age_consumed, \
    velocity::float8 AS velocity, age_destroyed::float8 AS age_destroyed, \
    social_volume::float8 AS social_volume, sentiment_balance::float8 AS sentiment_balance, \
    social_dominance::float8 AS social_dominance";

pub struct MarketRepository {
    pool: PgPool,
}

impl MarketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn cached_rate(
        &self,
        base: &str,
        target: &str,
    ) -> Result<Option<CachedRate>, DatabaseError> {
        let rate = sqlx::query_as::<_, CachedRate>(
            "SELECT conversion_rate::float8 AS conversion_rate, last_updated \
             FROM exchange_rate_cache WHERE base_code = $1 AND target_code = $2",
        )
        .bind(base)
        .bind(target)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rate)
    }

    pub async fn store_rate(
        &self,
        base: &str,
        target: &str,
        rate: f64,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO exchange_rate_cache \
             (base_code, target_code, conversion_rate, last_updated) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (base_code, target_code) \
             DO UPDATE SET conversion_rate = EXCLUDED.conversion_rate, \
             last_updated = EXCLUDED.last_updated",
        )
        .bind(base)
        .bind(target)
        .bind(rate)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_snapshot(&self, snapshot: &MarketSnapshot) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO market_data_snapshots \
             (timestamp, asset, top_holders_percent_of_total_supply, exchange_inflow, \
             exchange_outflow, active_addresses_24h, token_age_consumed, velocity, \
             age_destroyed, social_volume, sentiment_balance, social_dominance) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (timestamp, asset) DO UPDATE SET \
             top_holders_percent_of_total_supply = \
             EXCLUDED.top_holders_percent_of_total_supply, \
             exchange_inflow = EXCLUDED.exchange_inflow, \
             exchange_outflow = EXCLUDED.exchange_outflow, \
             active_addresses_24h = EXCLUDED.active_addresses_24h, \
             token_age_consumed = EXCLUDED.token_age_consumed, \
             velocity = EXCLUDED.velocity, age_destroyed = EXCLUDED.age_destroyed, \
             social_volume = EXCLUDED.social_volume, \
             sentiment_balance = EXCLUDED.sentiment_balance, \
             social_dominance = EXCLUDED.social_dominance",
        )
        .bind(snapshot.timestamp)
        .bind(&snapshot.asset)
        .bind(snapshot.top_holders_percent_of_total_supply)
        .bind(snapshot.exchange_inflow)
        .bind(snapshot.exchange_outflow)
        .bind(snapshot.active_addresses_24h)
        .bind(snapshot.token_age_consumed)
        .bind(snapshot.velocity)
        .bind(snapshot.age_destroyed)
        .bind(snapshot.social_volume)
        .bind(snapshot.sentiment_balance)
        .bind(snapshot.social_dominance)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Latest snapshot for `asset` taken at or before `at`
    pub async fn snapshot_before(
        &self,
        asset: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<MarketSnapshot>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM market_data_snapshots WHERE asset = $1 AND timestamp <= $2 \
             ORDER BY timestamp DESC LIMIT 1",
            SNAPSHOT_COLUMNS
        );
        let snapshot = sqlx::query_as::<_, MarketSnapshot>(&sql)
            .bind(asset)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(snapshot)
    }

    pub async fn upsert_whale_flows(
        &self,
        flows: &[WhaleFlow],
        at: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        if flows.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO dune_whale_data (date, whale_to_exchange, exchange_to_whale, \
             net_whale_selling, whale_exchange_tx_count, market_sentiment, last_updated) ",
        );
        query.push_values(flows, |mut row, flow| {
            row.push_bind(flow.date)
                .push_bind(flow.whale_to_exchange)
                .push_bind(flow.exchange_to_whale)
                .push_bind(flow.net_whale_selling)
                .push_bind(flow.whale_exchange_tx_count)
                .push_bind(&flow.market_sentiment)
                .push_bind(at);
        });
        query.push(
            " ON CONFLICT (date) DO UPDATE SET whale_to_exchange = EXCLUDED.whale_to_exchange, \
             exchange_to_whale = EXCLUDED.exchange_to_whale, \
             net_whale_selling = EXCLUDED.net_whale_selling, \
             whale_exchange_tx_count = EXCLUDED.whale_exchange_tx_count, \
             market_sentiment = EXCLUDED.market_sentiment, last_updated = EXCLUDED.last_updated",
        );

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
