//! Wiring of driven adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use spinwin::domain::{SpinServicePorts, SpinServiceRuntime};
use spinwin::inbound::http::state::HttpState;
use spinwin::outbound::memory::MemoryStore;
use spinwin::outbound::persistence::{
    DbPool, DieselReviewRepository, DieselRewardRepository, DieselSpinLedger,
};

use super::ServerConfig;

fn diesel_ports(pool: &DbPool) -> SpinServicePorts {
    SpinServicePorts::new(
        Arc::new(DieselRewardRepository::new(pool.clone())),
        Arc::new(DieselSpinLedger::new(pool.clone())),
        Arc::new(DieselReviewRepository::new(pool.clone())),
    )
}

fn memory_ports() -> SpinServicePorts {
    let store = Arc::new(MemoryStore::new());
    SpinServicePorts::new(store.clone(), store.clone(), store)
}

/// Build handler state over PostgreSQL when a pool is configured and over
/// the in-memory store otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL storage");
            diesel_ports(pool)
        }
        None => {
            warn!("no database configured; state is kept in memory and lost on restart");
            memory_ports()
        }
    };
    web::Data::new(HttpState::from_ports(
        ports,
        Arc::new(DefaultClock),
        SpinServiceRuntime::default(),
        config.policy,
    ))
}
