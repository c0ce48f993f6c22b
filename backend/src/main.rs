//! Spin & Win server entry-point: loads settings, prepares storage and serves
//! the REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use spinwin::inbound::http::health::HealthState;
use spinwin::outbound::persistence::{DbPool, run_pending_migrations};

fn startup_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

async fn prepare(settings: &ServerSettings) -> std::io::Result<ServerConfig> {
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| startup_error("invalid settings", err))?;
    let policy = settings
        .spin_policy()
        .map_err(|err| startup_error("invalid settings", err))?;
    let pool_config = settings
        .pool_config()
        .map_err(|err| startup_error("invalid settings", err))?;

    let config = ServerConfig::new(bind_addr, policy);
    let Some(pool_config) = pool_config else {
        return Ok(config);
    };

    run_pending_migrations(pool_config.database_url())
        .await
        .map_err(|err| startup_error("database migration failed", err))?;
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|err| startup_error("database pool failed", err))?;
    Ok(config.with_db_pool(pool))
}

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

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| startup_error("failed to load settings", err))?;
    let config = prepare(&settings).await?;
    let bind_addr = config.bind_addr;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "spin & win server listening");

    let draining = health_state.clone();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            draining.mark_draining();
        }
    });

    server.await
}
