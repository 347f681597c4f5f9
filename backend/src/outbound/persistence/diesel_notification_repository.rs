//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::{NewNotification, Notification, NotificationId, OrderId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the [`NotificationRepository`] port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> NotificationPersistenceError {
    map_pool_error(error, NotificationPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> NotificationPersistenceError {
    map_diesel_error(
        error,
        NotificationPersistenceError::query,
        NotificationPersistenceError::connection,
    )
}

fn row_to_notification(
    row: NotificationRow,
) -> Result<Notification, NotificationPersistenceError> {
    let kind = row.kind.parse().map_err(|err| {
        NotificationPersistenceError::query(format!("stored notification kind is invalid: {err}"))
    })?;
    Ok(Notification {
        id: NotificationId::from_uuid(row.id),
        recipient: UserId::from_uuid(row.recipient_id),
        order_id: OrderId::from_uuid(row.order_id),
        kind,
        message: row.message,
        read: row.is_read,
        created_at: row.created_at,
    })
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn append(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationPersistenceError> {
        let stored = Notification::unread(notification.clone());
        let row = NewNotificationRow {
            id: *stored.id.as_uuid(),
            recipient_id: *stored.recipient.as_uuid(),
            order_id: *stored.order_id.as_uuid(),
            kind: stored.kind.as_str(),
            message: stored.message.as_str(),
            is_read: stored.read,
            created_at: stored.created_at,
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(stored)
    }

    async fn recent_for(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::recipient_id.eq(*recipient.as_uuid()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(row_to_notification).collect()
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(notifications::table.find(*id.as_uuid()))
            .set(notifications::is_read.eq(true))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn unread_count(&self, recipient: UserId) -> Result<u64, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let count: i64 = notifications::table
            .filter(notifications::recipient_id.eq(*recipient.as_uuid()))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
