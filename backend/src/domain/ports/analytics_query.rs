//! Driving port for the admin analytics views.

use async_trait::async_trait;

use crate::domain::{AnalyticsPeriod, Dashboard, Error, ReviewDistribution, RewardTally, SpinBucket};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsQuery: Send + Sync {
    /// Spin counts per bucket over the period's window.
    async fn spins_over_time(&self, period: AnalyticsPeriod) -> Result<Vec<SpinBucket>, Error>;

    async fn review_distribution(&self) -> Result<ReviewDistribution, Error>;

    /// The most awarded rewards with their claim counts.
    async fn reward_tallies(&self) -> Result<Vec<RewardTally>, Error>;

    /// Daily spins, review distribution and reward tallies together.
    async fn dashboard(&self) -> Result<Dashboard, Error>;
}
