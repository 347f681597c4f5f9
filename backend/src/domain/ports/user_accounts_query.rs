//! Driving port for user profile reads.

use async_trait::async_trait;

use crate::domain::{Error, ExternalId, UserProfile};

/// Domain use-case port for reading user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountsQuery: Send + Sync {
    /// Load a user with their per-currency traded volume.
    async fn profile(&self, external_id: &ExternalId) -> Result<UserProfile, Error>;
}
