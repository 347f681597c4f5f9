//! Marketplace statistics service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::identity_service::map_ledger_error;
use crate::domain::ports::{LedgerRepository, MarketStatsQuery};
use crate::domain::{Error, PlatformStats};

/// Read-only service over the statistics ledger.
#[derive(Clone)]
pub struct LedgerService<L> {
    ledger: Arc<L>,
}

impl<L> LedgerService<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl<L> MarketStatsQuery for LedgerService<L>
where
    L: LedgerRepository,
{
    async fn platform_stats(&self) -> Result<PlatformStats, Error> {
        self.ledger.platform_stats().await.map_err(map_ledger_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{LedgerPersistenceError, MockLedgerRepository};

    #[rstest]
    #[tokio::test]
    async fn platform_stats_pass_through() {
        let expected = PlatformStats {
            completed_deals: 3,
            total_users: 12,
            active_orders: 4,
        };
        let mut ledger = MockLedgerRepository::new();
        ledger
            .expect_platform_stats()
            .times(1)
            .return_once(move || Ok(expected));

        let stats = LedgerService::new(Arc::new(ledger))
            .platform_stats()
            .await
            .expect("stats");

        assert_eq!(stats, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn platform_stats_failure_is_internal() {
        let mut ledger = MockLedgerRepository::new();
        ledger
            .expect_platform_stats()
            .return_once(|| Err(LedgerPersistenceError::query("timeout")));

        let err = LedgerService::new(Arc::new(ledger))
            .platform_stats()
            .await
            .expect_err("failure");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
