//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{ExternalId, RequisitesUpdate, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert `user` unless its external id is already taken.
    ///
    /// Concurrent inserts for the same external id must leave exactly one
    /// row; the losing call is not an error.
    async fn insert_if_absent(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by external identifier.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by internal identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Write the requisite fields `update` sets, leaving the others as
    /// stored. Returns `false` when no such user exists.
    ///
    /// The merge happens inside the adapter so concurrent updates touching
    /// different fields never overwrite each other.
    async fn merge_requisites(
        &self,
        id: UserId,
        update: &RequisitesUpdate,
    ) -> Result<bool, UserPersistenceError>;
}
