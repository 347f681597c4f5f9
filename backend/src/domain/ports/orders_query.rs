//! Driving port for order reads.

use async_trait::async_trait;

use crate::domain::{Error, ExternalId, Order, OrderStatus, ParticipantRole};

/// Largest page the public order feed serves.
pub const PUBLIC_LIST_MAX: usize = 200;
/// Page size used when the client does not ask for one.
pub const PUBLIC_LIST_DEFAULT: usize = 50;
/// Cap on the orders returned for one user.
pub const USER_ORDERS_MAX: usize = 200;

/// Domain use-case port for order read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersQuery: Send + Sync {
    /// Fetch an order by id or code.
    async fn lookup(&self, identifier: &str) -> Result<Order, Error>;

    /// Orders the user participates in, newest first.
    async fn list_for_user(&self, external_id: &ExternalId) -> Result<Vec<Order>, Error>;

    /// Public order feed filtered by status, newest first. `limit` is clamped
    /// to `1..=PUBLIC_LIST_MAX`.
    async fn list_public(&self, status: OrderStatus, limit: usize) -> Result<Vec<Order>, Error>;

    /// Role the user holds in the order, if any.
    async fn role_of(
        &self,
        identifier: &str,
        external_id: &ExternalId,
    ) -> Result<Option<ParticipantRole>, Error>;
}
