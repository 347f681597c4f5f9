//! Port abstraction for order persistence, covering the order store, the
//! participant registry and the settlement transaction.
use async_trait::async_trait;

use crate::domain::{
    Order, OrderId, OrderIdentifier, OrderStatus, ParticipantRole, Settlement, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// Another order already uses the candidate code.
        DuplicateCode { code: String } => "order code {code} is already taken",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store a new order and its seller participation atomically.
    ///
    /// Fails with [`OrderPersistenceError::DuplicateCode`] when the code is
    /// taken, leaving nothing behind.
    async fn insert_with_seller(&self, order: &Order) -> Result<(), OrderPersistenceError>;

    /// Fetch an order by id or code.
    async fn find(
        &self,
        identifier: &OrderIdentifier,
    ) -> Result<Option<Order>, OrderPersistenceError>;

    /// Orders `user` participates in, newest first.
    async fn list_for_user(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, OrderPersistenceError>;

    /// Orders in `status`, newest first.
    async fn list_by_status(
        &self,
        status: OrderStatus,
        limit: usize,
    ) -> Result<Vec<Order>, OrderPersistenceError>;

    /// Bind `buyer` to an active order that has no buyer yet, recording the
    /// buyer participation in the same transaction.
    ///
    /// Returns `None` and changes nothing when the order is no longer active
    /// or another buyer is already bound.
    async fn bind_buyer(
        &self,
        order: OrderId,
        buyer: UserId,
    ) -> Result<Option<Order>, OrderPersistenceError>;

    /// Move the order to `target` if its status is one of `sources`,
    /// refreshing `updated_at`. Returns `None` when the status had moved on.
    async fn transition(
        &self,
        order: OrderId,
        sources: &[OrderStatus],
        target: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError>;

    /// Complete the order if its status is one of `sources`, crediting both
    /// participants' deal counts and volumes in the same transaction.
    /// Returns `None` when the status had moved on.
    async fn complete(
        &self,
        settlement: &Settlement,
        sources: &[OrderStatus],
    ) -> Result<Option<Order>, OrderPersistenceError>;

    /// Role recorded for `user` in the participant registry.
    async fn role_of(
        &self,
        order: OrderId,
        user: UserId,
    ) -> Result<Option<ParticipantRole>, OrderPersistenceError>;
}
