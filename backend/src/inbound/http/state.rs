//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised against in-memory adapters without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AnalyticsQuery, ReviewCommand, ReviewQuery, RewardAdminCommand, RewardAdminQuery,
    SpinCommand, SpinQuery,
};
use crate::domain::{
    AnalyticsService, ReviewService, RewardService, SpinPolicy, SpinService, SpinServicePorts,
    SpinServiceRuntime,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub spins: Arc<dyn SpinCommand>,
    pub spins_query: Arc<dyn SpinQuery>,
    pub rewards: Arc<dyn RewardAdminCommand>,
    pub rewards_query: Arc<dyn RewardAdminQuery>,
    pub reviews: Arc<dyn ReviewCommand>,
    pub reviews_query: Arc<dyn ReviewQuery>,
    pub analytics: Arc<dyn AnalyticsQuery>,
}

impl HttpState {
    /// Bundle services that each implement both halves of their port pair.
    pub fn new<S, W, V, A>(spins: Arc<S>, rewards: Arc<W>, reviews: Arc<V>, analytics: Arc<A>) -> Self
    where
        S: SpinCommand + SpinQuery + 'static,
        W: RewardAdminCommand + RewardAdminQuery + 'static,
        V: ReviewCommand + ReviewQuery + 'static,
        A: AnalyticsQuery + 'static,
    {
        Self {
            spins: spins.clone(),
            spins_query: spins,
            rewards: rewards.clone(),
            rewards_query: rewards,
            reviews: reviews.clone(),
            reviews_query: reviews,
            analytics,
        }
    }

    /// Wire the domain services over one set of driven adapters.
    pub fn from_ports(
        ports: SpinServicePorts,
        clock: Arc<dyn Clock>,
        runtime: SpinServiceRuntime,
        policy: SpinPolicy,
    ) -> Self {
        let rewards = Arc::new(RewardService::new(ports.rewards.clone(), clock.clone()));
        let reviews = Arc::new(ReviewService::new(
            ports.reviews.clone(),
            ports.ledger.clone(),
            clock.clone(),
        ));
        let analytics = Arc::new(AnalyticsService::new(
            ports.ledger.clone(),
            ports.reviews.clone(),
            clock.clone(),
        ));
        let spins = Arc::new(SpinService::with_runtime(ports, clock, runtime, policy));
        Self::new(spins, rewards, reviews, analytics)
    }
}
