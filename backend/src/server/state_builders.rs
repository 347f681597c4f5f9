//! Builders selecting the driven adapters behind the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use escrow_market::domain::RandomOrderCodeGenerator;
use escrow_market::inbound::http::state::{DrivenAdapters, HttpState};
use escrow_market::outbound::memory::InMemoryMarket;
use escrow_market::outbound::persistence::{
    DbPool, DieselLedgerRepository, DieselNotificationRepository, DieselOrderRepository,
    DieselUserRepository,
};

use super::ServerConfig;

fn diesel_adapters(
    pool: &DbPool,
) -> DrivenAdapters<
    DieselUserRepository,
    DieselOrderRepository,
    DieselNotificationRepository,
    DieselLedgerRepository,
> {
    DrivenAdapters {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        ledger: Arc::new(DieselLedgerRepository::new(pool.clone())),
    }
}

fn memory_adapters()
-> DrivenAdapters<InMemoryMarket, InMemoryMarket, InMemoryMarket, InMemoryMarket> {
    let market = Arc::new(InMemoryMarket::new());
    DrivenAdapters {
        users: market.clone(),
        orders: market.clone(),
        notifications: market.clone(),
        ledger: market,
    }
}

/// Build the handler state, using PostgreSQL when a pool is configured and
/// the in-memory store otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let codes = Arc::new(RandomOrderCodeGenerator);
    let admins = config.admins.clone();
    let state = match &config.db_pool {
        Some(pool) => {
            info!(admins = admins.len(), "serving marketplace from PostgreSQL");
            HttpState::from_adapters(diesel_adapters(pool), codes, admins)
        }
        None => {
            warn!("no database configured; marketplace state is held in memory");
            HttpState::from_adapters(memory_adapters(), codes, admins)
        }
    };
    web::Data::new(state)
}
