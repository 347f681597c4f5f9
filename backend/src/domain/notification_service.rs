//! Notification queue services.
//!
//! [`NotificationPublisher`] is the fire-and-forget side used by the order
//! state machine; [`NotificationService`] implements the polling inbox.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::domain::identity_service::require_user;
use crate::domain::ports::{
    NotificationInbox, NotificationPersistenceError, NotificationRepository, UserRepository,
};
use crate::domain::{
    Error, ExternalId, NOTIFICATION_FETCH_MAX, NewNotification, Notification, NotificationId,
};

fn map_notification_error(err: NotificationPersistenceError) -> Error {
    error!(error = %err, "notification repository failure");
    match err {
        NotificationPersistenceError::Connection { message } => {
            Error::internal(format!("notification repository unavailable: {message}"))
        }
        NotificationPersistenceError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

/// Best-effort notification enqueueing.
///
/// Failures are logged at `warn` and never surface to the caller: a missed
/// notification must not undo the transition it reports.
pub struct NotificationPublisher<N> {
    repo: Arc<N>,
}

impl<N> Clone for NotificationPublisher<N> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<N> NotificationPublisher<N>
where
    N: NotificationRepository,
{
    pub fn new(repo: Arc<N>) -> Self {
        Self { repo }
    }

    /// Enqueue `notification`, swallowing storage failures.
    pub async fn publish(&self, notification: NewNotification) {
        if let Err(err) = self.repo.append(&notification).await {
            warn!(
                error = %err,
                recipient = %notification.recipient,
                order_id = %notification.order_id,
                kind = %notification.kind,
                "dropping notification after enqueue failure"
            );
        }
    }
}

/// Notification inbox service implementing [`NotificationInbox`].
#[derive(Clone)]
pub struct NotificationService<U, N> {
    users: Arc<U>,
    notifications: Arc<N>,
}

impl<U, N> NotificationService<U, N> {
    /// Create a new service with the given repositories.
    pub fn new(users: Arc<U>, notifications: Arc<N>) -> Self {
        Self {
            users,
            notifications,
        }
    }
}

#[async_trait]
impl<U, N> NotificationInbox for NotificationService<U, N>
where
    U: UserRepository,
    N: NotificationRepository,
{
    async fn fetch_recent(
        &self,
        external_id: &ExternalId,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, Error> {
        let user = require_user(self.users.as_ref(), external_id).await?;
        let limit = limit
            .unwrap_or(NOTIFICATION_FETCH_MAX)
            .clamp(1, NOTIFICATION_FETCH_MAX);
        self.notifications
            .recent_for(user.id(), limit)
            .await
            .map_err(map_notification_error)
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), Error> {
        self.notifications
            .mark_read(id)
            .await
            .map_err(map_notification_error)
    }

    async fn unread_count(&self, external_id: &ExternalId) -> Result<u64, Error> {
        let user = require_user(self.users.as_ref(), external_id).await?;
        self.notifications
            .unread_count(user.id())
            .await
            .map_err(map_notification_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockNotificationRepository, MockUserRepository};
    use crate::domain::{DisplayName, ErrorCode, NotificationKind, OrderCode, OrderId, User, UserId};

    fn known_user() -> User {
        User::register(
            ExternalId::new("tg-9").expect("valid id"),
            DisplayName::new("Carol").expect("valid name"),
        )
    }

    #[rstest]
    #[case(None, NOTIFICATION_FETCH_MAX)]
    #[case(Some(0), 1)]
    #[case(Some(10), 10)]
    #[case(Some(500), NOTIFICATION_FETCH_MAX)]
    #[tokio::test]
    async fn fetch_recent_clamps_limit(#[case] requested: Option<usize>, #[case] expected: usize) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_external_id()
            .return_once(|_| Ok(Some(known_user())));
        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_recent_for()
            .withf(move |_, limit| *limit == expected)
            .times(1)
            .return_once(|_, _| Ok(Vec::new()));

        let service = NotificationService::new(Arc::new(users), Arc::new(notifications));
        let fetched = service
            .fetch_recent(&ExternalId::new("tg-9").expect("valid id"), requested)
            .await
            .expect("fetch succeeds");

        assert!(fetched.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn fetch_recent_for_unknown_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_external_id().return_once(|_| Ok(None));

        let service = NotificationService::new(
            Arc::new(users),
            Arc::new(MockNotificationRepository::new()),
        );
        let err = service
            .fetch_recent(&ExternalId::new("ghost").expect("valid id"), None)
            .await
            .expect_err("unknown user");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn publish_swallows_storage_failures() {
        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_append()
            .times(1)
            .return_once(|_| Err(NotificationPersistenceError::query("disk full")));

        let publisher = NotificationPublisher::new(Arc::new(notifications));
        let code = OrderCode::parse("AAAA1111").expect("valid code");
        publisher
            .publish(NewNotification::about(
                UserId::random(),
                OrderId::random(),
                &code,
                NotificationKind::BuyerJoined,
            ))
            .await;
    }
}
