//! Port abstraction for statistics ledger reads.
//!
//! Ledger rows are only ever written by
//! [`OrderRepository::complete`](super::OrderRepository::complete), so this
//! port is read-only.
use async_trait::async_trait;

use crate::domain::{CurrencyVolumes, PlatformStats, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ledger repository adapters.
    pub enum LedgerPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "ledger repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "ledger repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Summed traded volume per currency for `user`.
    async fn volumes_for(&self, user: UserId) -> Result<CurrencyVolumes, LedgerPersistenceError>;

    /// Marketplace-wide counters.
    async fn platform_stats(&self) -> Result<PlatformStats, LedgerPersistenceError>;
}
