//! Runtime settings loaded via OrthoConfig and the server configuration
//! object built from them.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use escrow_market::domain::{ExternalId, UserValidationError};
use escrow_market::outbound::persistence::{DEFAULT_POOL_MAX_SIZE, DbPool};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid admin external id `{value}`: {source}")]
    AdminId {
        value: String,
        source: UserValidationError,
    },
}

/// Marketplace settings from CLI flags, `MARKET_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MARKET")]
pub struct MarketSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Comma-separated external ids allowed to drive any order.
    pub admin_external_ids: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl MarketSettings {
    /// Configured bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|source| SettingsError::BindAddr {
                value: raw.to_owned(),
                source,
            })
    }

    /// Parsed administrator ids. Blank entries are skipped.
    pub fn admin_external_ids(&self) -> Result<Vec<ExternalId>, SettingsError> {
        self.admin_external_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                ExternalId::new(entry).map_err(|source| SettingsError::AdminId {
                    value: entry.to_owned(),
                    source,
                })
            })
            .collect()
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) admins: Vec<ExternalId>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            admins: Vec::new(),
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the server uses the Diesel adapters; otherwise every
    /// port is served from the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Users allowed to drive any permitted transition on any order.
    #[must_use]
    pub fn with_admins(mut self, admins: Vec<ExternalId>) -> Self {
        self.admins = admins;
        self
    }
}
