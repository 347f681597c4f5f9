//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the marketplace's driven ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` connection pool.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Business rules stay in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Conditional writes**: buyer binding and status changes are guarded
//!   `UPDATE ... RETURNING` statements; completion is one transaction.
//!
//! # Example
//!
//! ```ignore
//! use escrow_market::outbound::persistence::{DbPool, DieselOrderRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/market")).await?;
//! let orders = DieselOrderRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_ledger_repository;
mod diesel_notification_repository;
mod diesel_order_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_ledger_repository::DieselLedgerRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_POOL_MAX_SIZE, DbPool, PoolConfig, PoolError};
