//! PostgreSQL-backed `LedgerRepository` implementation using Diesel ORM.
//!
//! Volumes are summed per currency at read time; nothing is pre-aggregated.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;

use crate::domain::ports::{LedgerPersistenceError, LedgerRepository};
use crate::domain::{Currency, CurrencyVolumes, OrderStatus, PlatformStats, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{orders, users, volume_entries};

/// Diesel-backed implementation of the [`LedgerRepository`] port.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> LedgerPersistenceError {
    map_pool_error(error, LedgerPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> LedgerPersistenceError {
    map_diesel_error(
        error,
        LedgerPersistenceError::query,
        LedgerPersistenceError::connection,
    )
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Fold summed `(currency, amount)` rows into [`CurrencyVolumes`].
fn collect_volumes(
    rows: Vec<(String, Option<Decimal>)>,
) -> Result<CurrencyVolumes, LedgerPersistenceError> {
    let amounts = rows
        .into_iter()
        .map(|(currency, amount)| {
            let currency: Currency = currency.parse().map_err(|err| {
                LedgerPersistenceError::query(format!("stored currency is invalid: {err}"))
            })?;
            Ok((currency, amount.unwrap_or_default()))
        })
        .collect::<Result<Vec<_>, LedgerPersistenceError>>()?;
    CurrencyVolumes::from_amounts(amounts)
        .map_err(|err| LedgerPersistenceError::query(err.to_string()))
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn volumes_for(&self, user: UserId) -> Result<CurrencyVolumes, LedgerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<(String, Option<Decimal>)> = volume_entries::table
            .filter(volume_entries::user_id.eq(*user.as_uuid()))
            .group_by(volume_entries::currency)
            .select((volume_entries::currency, diesel::dsl::sum(volume_entries::amount)))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        collect_volumes(rows)
    }

    async fn platform_stats(&self) -> Result<PlatformStats, LedgerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let completed_deals: i64 = orders::table
            .filter(orders::status.eq(OrderStatus::Completed.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let total_users: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let active_orders: i64 = orders::table
            .filter(orders::status.eq(OrderStatus::Active.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(PlatformStats {
            completed_deals: to_count(completed_deals),
            total_users: to_count(total_users),
            active_orders: to_count(active_orders),
        })
    }
}
