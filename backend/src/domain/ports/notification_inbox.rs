//! Driving port for polling and acknowledging notifications.

use async_trait::async_trait;

use crate::domain::{Error, ExternalId, Notification, NotificationId};

/// Domain use-case port for a user's notification queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Latest notifications, newest first. `limit` defaults to and is capped
    /// at [`NOTIFICATION_FETCH_MAX`](crate::domain::NOTIFICATION_FETCH_MAX).
    async fn fetch_recent(
        &self,
        external_id: &ExternalId,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, Error>;

    /// Mark a notification read. Repeating the call is harmless.
    async fn mark_read(&self, id: NotificationId) -> Result<(), Error>;

    /// Count of unread notifications.
    async fn unread_count(&self, external_id: &ExternalId) -> Result<u64, Error>;
}
