//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters; driving
//! ports (`*Command`, `*Query`, [`NotificationInbox`]) are implemented by the
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod ledger_repository;
mod market_stats_query;
mod notification_inbox;
mod notification_repository;
mod order_repository;
mod orders_command;
mod orders_query;
mod user_accounts_command;
mod user_accounts_query;
mod user_repository;

#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{LedgerPersistenceError, LedgerRepository};
#[cfg(test)]
pub use market_stats_query::MockMarketStatsQuery;
pub use market_stats_query::MarketStatsQuery;
#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::NotificationInbox;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationPersistenceError, NotificationRepository};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderPersistenceError, OrderRepository};
#[cfg(test)]
pub use orders_command::MockOrdersCommand;
pub use orders_command::{
    CreateOrderRequest, JoinOrderRequest, JoinOutcome, OrdersCommand, UpdateStatusRequest,
};
#[cfg(test)]
pub use orders_query::MockOrdersQuery;
pub use orders_query::{OrdersQuery, PUBLIC_LIST_DEFAULT, PUBLIC_LIST_MAX, USER_ORDERS_MAX};
#[cfg(test)]
pub use user_accounts_command::MockUserAccountsCommand;
pub use user_accounts_command::{ResolveUserRequest, UserAccountsCommand};
#[cfg(test)]
pub use user_accounts_query::MockUserAccountsQuery;
pub use user_accounts_query::UserAccountsQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
