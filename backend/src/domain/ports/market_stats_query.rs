//! Driving port for marketplace-wide statistics.

use async_trait::async_trait;

use crate::domain::{Error, PlatformStats};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketStatsQuery: Send + Sync {
    /// Completed deals, registered users and active orders.
    async fn platform_stats(&self) -> Result<PlatformStats, Error>;
}
