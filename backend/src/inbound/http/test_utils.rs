//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::Trace;
use crate::domain::{ExternalId, RandomOrderCodeGenerator};
use crate::inbound::http::api_scope;
use crate::inbound::http::state::{DrivenAdapters, HttpState};
use crate::outbound::memory::InMemoryMarket;

/// Handler state over a fresh in-memory market, plus the market itself so
/// tests can inspect stored rows.
pub fn memory_state(admins: &[&str]) -> (Arc<InMemoryMarket>, HttpState) {
    let market = Arc::new(InMemoryMarket::new());
    let adapters = DrivenAdapters {
        users: market.clone(),
        orders: market.clone(),
        notifications: market.clone(),
        ledger: market.clone(),
    };
    let admins = admins
        .iter()
        .map(|raw| ExternalId::new(*raw).expect("valid admin id"));
    let state = HttpState::from_adapters(adapters, Arc::new(RandomOrderCodeGenerator), admins);
    (market, state)
}

/// Application with the full `/api` scope and trace middleware.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(api_scope())
}
