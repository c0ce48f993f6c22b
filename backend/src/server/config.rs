//! Startup settings loaded via OrthoConfig and the server configuration
//! derived from them.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use spinwin::domain::SpinPolicy;
use spinwin::outbound::persistence::{DbPool, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings read from `SPINWIN_*` environment variables, config files and
/// command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SPINWIN")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server keeps state in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Selections attempted per spin before answering `no_prize`.
    #[ortho_config(default = 5)]
    pub max_allocation_attempts: u32,
    /// Redemption codes tried per selection.
    #[ortho_config(default = 8)]
    pub max_code_attempts: u32,
}

/// Settings that cannot start a server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("bind address {value:?} is not a socket address")]
    InvalidBindAddr { value: String },
    #[error("{field} must be at least 1")]
    ZeroLimit { field: &'static str },
}

fn at_least_one(value: u32, field: &'static str) -> Result<u32, SettingsError> {
    match value {
        0 => Err(SettingsError::ZeroLimit { field }),
        value => Ok(value),
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    pub fn spin_policy(&self) -> Result<SpinPolicy, SettingsError> {
        Ok(SpinPolicy {
            max_allocation_attempts: at_least_one(
                self.max_allocation_attempts,
                "max_allocation_attempts",
            )?,
            max_code_attempts: at_least_one(self.max_code_attempts, "max_code_attempts")?,
        })
    }

    /// Pool settings, or `None` when no database is configured.
    pub fn pool_config(&self) -> Result<Option<PoolConfig>, SettingsError> {
        let Some(url) = self.database_url.as_deref() else {
            return Ok(None);
        };
        let max_size = at_least_one(self.db_max_connections, "db_max_connections")?;
        Ok(Some(PoolConfig::new(url).with_max_size(max_size)))
    }
}

/// Everything the HTTP server needs once storage has been prepared.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) policy: SpinPolicy,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, policy: SpinPolicy) -> Self {
        Self {
            bind_addr,
            policy,
            db_pool: None,
        }
    }

    /// Use the PostgreSQL adapters instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
