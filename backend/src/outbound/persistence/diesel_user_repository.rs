//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Registration relies on the unique `external_id` constraint: concurrent
//! first resolutions both issue `INSERT ... ON CONFLICT DO NOTHING`, and the
//! loser simply reads the winner's row.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    DisplayName, ExternalId, Requisites, RequisitesUpdate, User, UserDraft, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, RequisitesChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn invalid(field: &str, err: &dyn std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("stored {field} is invalid: {err}"))
}

/// Convert a database row into a domain [`User`].
pub(crate) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let external_id =
        ExternalId::new(row.external_id).map_err(|err| invalid("external id", &err))?;
    let display_name =
        DisplayName::new(row.display_name).map_err(|err| invalid("display name", &err))?;
    let completed_deals =
        u32::try_from(row.completed_deals).map_err(|err| invalid("completed deals", &err))?;

    Ok(User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        external_id,
        display_name,
        requisites: Requisites {
            wallet: row.wallet,
            card_number: row.card_number,
            card_bank: row.card_bank,
            card_currency: row.card_currency,
            messaging_handle: row.messaging_handle,
        },
        completed_deals,
        created_at: row.created_at,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert_if_absent(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            external_id: user.external_id().as_ref(),
            display_name: user.display_name().as_ref(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::external_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::external_id.eq(external_id.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn merge_requisites(
        &self,
        id: UserId,
        update: &RequisitesUpdate,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        if update.is_empty() {
            // Diesel refuses an empty SET clause; report existence instead.
            let exists = users::table
                .find(id.as_uuid())
                .select(users::id)
                .first::<Uuid>(&mut conn)
                .await
                .optional()
                .map_err(diesel_error)?;
            return Ok(exists.is_some());
        }
        let changes = RequisitesChangeset::from(update);

        let updated = diesel::update(users::table.find(id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }
}
