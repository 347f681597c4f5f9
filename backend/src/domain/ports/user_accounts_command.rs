//! Driving port for identity resolution and requisite updates.

use async_trait::async_trait;

use crate::domain::{DisplayName, Error, ExternalId, RequisitesUpdate, User};

/// Request to resolve a client identity, registering it on first sight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveUserRequest {
    pub external_id: ExternalId,
    pub display_name: DisplayName,
}

/// Domain use-case port for mutating user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountsCommand: Send + Sync {
    /// Return the user for `external_id`, creating it when absent.
    ///
    /// The stored display name is never overwritten by later calls.
    async fn resolve_or_create(&self, request: ResolveUserRequest) -> Result<User, Error>;

    /// Merge `update` into the user's settlement requisites.
    async fn update_requisites(
        &self,
        external_id: &ExternalId,
        update: RequisitesUpdate,
    ) -> Result<(), Error>;
}
