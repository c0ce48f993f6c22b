//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, web};
use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;

use crate::Trace;
use crate::domain::ports::RewardRepository;
use crate::domain::{RewardDefinition, SpinPolicy, SpinServicePorts, SpinServiceRuntime};
use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::test_support::{FixedDraw, MutableClock, ScriptedCodes, prize, try_again_slice};

pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// HTTP state over a fresh in-memory store with scripted randomness.
pub(crate) struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<MutableClock>,
    pub state: HttpState,
}

impl TestHarness {
    pub async fn seed(&self, reward: RewardDefinition) -> RewardDefinition {
        self.store.insert(&reward).await.expect("seed reward");
        reward
    }

    pub async fn seed_prize(&self, name: &str, stock: u32) -> RewardDefinition {
        self.seed(prize(name, stock, self.clock_now())).await
    }

    pub async fn seed_slice(&self, weight: f64) -> RewardDefinition {
        self.seed(try_again_slice(weight, self.clock_now())).await
    }

    fn clock_now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

/// Build a harness whose draws always land on `point`.
pub(crate) fn harness(point: f64, codes: &[&str]) -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MutableClock::new(start()));
    let ports = SpinServicePorts::new(store.clone(), store.clone(), store.clone());
    let runtime = SpinServiceRuntime {
        draw: Arc::new(FixedDraw(point)),
        codes: Arc::new(ScriptedCodes::new(codes)),
    };
    let state = HttpState::from_ports(ports, clock.clone(), runtime, SpinPolicy::default());
    TestHarness {
        store,
        clock,
        state,
    }
}

/// Application with every API route mounted under `/api/v1`.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure))
}
