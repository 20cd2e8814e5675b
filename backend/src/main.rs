//! Backend entry-point: loads settings, prepares the ledger backend, and
//! serves the points API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use kabadiyo::config::AppSettings;
use kabadiyo::domain::default_catalog;
use kabadiyo::domain::ports::LedgerRepository;
use kabadiyo::inbound::http::session_config::{BuildMode, session_settings_from_env};
use kabadiyo::outbound::persistence::{
    DbPool, DieselLedgerRepository, PoolConfig, run_pending_migrations,
};
use server::{ServerConfig, create_server, health_state_for};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;

    let mut config = ServerConfig::new(session, bind_addr);
    if let Some(pool) = prepare_database(&settings).await? {
        config = config.with_db_pool(pool);
    } else {
        info!("no database configured; ledger state lives in memory");
    }

    let health_state = health_state_for(&config);
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}

/// Connect, migrate, and optionally seed when a database URL is set.
async fn prepare_database(settings: &AppSettings) -> io::Result<Option<DbPool>> {
    let Some(database_url) = settings.database_url() else {
        return Ok(None);
    };

    if settings.run_migrations() {
        run_pending_migrations(database_url)
            .await
            .map_err(io::Error::other)?;
    }

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    if settings.seed_rewards() {
        let inserted = DieselLedgerRepository::new(pool.clone())
            .seed_rewards(&default_catalog())
            .await
            .map_err(|error| io::Error::other(format!("seed reward catalog: {error}")))?;
        info!(inserted, "reward catalog seeded");
    }

    Ok(Some(pool))
}
