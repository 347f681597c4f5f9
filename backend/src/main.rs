//! Backend entry-point: loads settings, prepares storage and serves the
//! marketplace API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use escrow_market::inbound::http::health::HealthState;
use escrow_market::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{MarketSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = MarketSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let admins = settings.admin_external_ids().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr).with_admins(admins);
    if let Some(database_url) = settings.database_url.as_deref() {
        let applied = run_pending_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
        info!(applied, "database schema up to date");

        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.pool_max_size()),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    } else {
        warn!("MARKET_DATABASE_URL not set; using the in-memory store");
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting escrow marketplace");
    create_server(health_state, config)?.await
}
