//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LedgerRepository, MarketStatsQuery, NotificationInbox, NotificationRepository,
    OrderRepository, OrdersCommand, OrdersQuery, UserAccountsCommand, UserAccountsQuery,
    UserRepository,
};
use crate::domain::{
    ExternalId, IdentityService, LedgerService, NotificationService, OrderCodeGenerator,
    OrderService,
};

/// Parameter object bundling all driving port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn UserAccountsCommand>,
    pub profiles: Arc<dyn UserAccountsQuery>,
    pub orders: Arc<dyn OrdersCommand>,
    pub orders_query: Arc<dyn OrdersQuery>,
    pub inbox: Arc<dyn NotificationInbox>,
    pub stats: Arc<dyn MarketStatsQuery>,
}

/// Driven adapters the domain services are built on.
pub struct DrivenAdapters<U, O, N, L> {
    pub users: Arc<U>,
    pub orders: Arc<O>,
    pub notifications: Arc<N>,
    pub ledger: Arc<L>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn UserAccountsCommand>,
    pub profiles: Arc<dyn UserAccountsQuery>,
    pub orders: Arc<dyn OrdersCommand>,
    pub orders_query: Arc<dyn OrdersQuery>,
    pub inbox: Arc<dyn NotificationInbox>,
    pub stats: Arc<dyn MarketStatsQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            profiles,
            orders,
            orders_query,
            inbox,
            stats,
        } = ports;
        Self {
            accounts,
            profiles,
            orders,
            orders_query,
            inbox,
            stats,
        }
    }

    /// Wire the domain services over a set of driven adapters.
    ///
    /// `admins` may drive any permitted transition on any order.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use escrow_market::domain::RandomOrderCodeGenerator;
    /// use escrow_market::inbound::http::state::{DrivenAdapters, HttpState};
    /// use escrow_market::outbound::memory::InMemoryMarket;
    ///
    /// let market = Arc::new(InMemoryMarket::new());
    /// let adapters = DrivenAdapters {
    ///     users: market.clone(),
    ///     orders: market.clone(),
    ///     notifications: market.clone(),
    ///     ledger: market,
    /// };
    /// let state = HttpState::from_adapters(adapters, Arc::new(RandomOrderCodeGenerator), []);
    /// let _orders = state.orders.clone();
    /// ```
    pub fn from_adapters<U, O, N, L, G>(
        adapters: DrivenAdapters<U, O, N, L>,
        codes: Arc<G>,
        admins: impl IntoIterator<Item = ExternalId>,
    ) -> Self
    where
        U: UserRepository + 'static,
        O: OrderRepository + 'static,
        N: NotificationRepository + 'static,
        L: LedgerRepository + 'static,
        G: OrderCodeGenerator + 'static,
    {
        let DrivenAdapters {
            users,
            orders,
            notifications,
            ledger,
        } = adapters;

        let identity = Arc::new(IdentityService::new(users.clone(), ledger.clone()));
        let order_service = Arc::new(
            OrderService::new(users.clone(), orders, notifications.clone(), codes)
                .with_admins(admins),
        );
        let inbox = Arc::new(NotificationService::new(users, notifications));
        let stats = Arc::new(LedgerService::new(ledger));

        Self::new(HttpStatePorts {
            accounts: identity.clone(),
            profiles: identity,
            orders: order_service.clone(),
            orders_query: order_service,
            inbox,
            stats,
        })
    }
}
