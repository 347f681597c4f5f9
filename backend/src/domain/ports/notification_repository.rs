//! Port abstraction for the notification queue store.
use async_trait::async_trait;

use crate::domain::{NewNotification, Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by notification repository adapters.
    pub enum NotificationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Append an unread notification to the recipient's queue.
    async fn append(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationPersistenceError>;

    /// Latest notifications for `recipient`, newest first.
    async fn recent_for(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationPersistenceError>;

    /// Flag a notification as read. Unknown ids are ignored.
    async fn mark_read(&self, id: NotificationId) -> Result<(), NotificationPersistenceError>;

    /// Number of unread notifications for `recipient`.
    async fn unread_count(&self, recipient: UserId) -> Result<u64, NotificationPersistenceError>;
}
