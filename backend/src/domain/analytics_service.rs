//! Analytics service backing the admin dashboard.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{AnalyticsQuery, ReviewRepository, SpinLedger};
use crate::domain::spin_service::{map_ledger_error, map_review_repository_error};
use crate::domain::{
    AnalyticsPeriod, Dashboard, Error, ReviewDistribution, RewardTally, SpinBucket,
    review_distribution, reward_tallies, spins_over_time,
};

/// Analytics service implementing [`AnalyticsQuery`].
pub struct AnalyticsService<L: ?Sized, R: ?Sized> {
    ledger: Arc<L>,
    reviews: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<L: ?Sized, R: ?Sized> AnalyticsService<L, R> {
    pub fn new(ledger: Arc<L>, reviews: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            reviews,
            clock,
        }
    }
}

#[async_trait]
impl<L, R> AnalyticsQuery for AnalyticsService<L, R>
where
    L: SpinLedger + ?Sized,
    R: ReviewRepository + ?Sized,
{
    async fn spins_over_time(&self, period: AnalyticsPeriod) -> Result<Vec<SpinBucket>, Error> {
        let now = self.clock.utc();
        let outcomes = self
            .ledger
            .list_since(Some(period.window_start(now)))
            .await
            .map_err(map_ledger_error)?;
        Ok(spins_over_time(&outcomes, period, now))
    }

    async fn review_distribution(&self) -> Result<ReviewDistribution, Error> {
        let ratings = self
            .reviews
            .list_ratings()
            .await
            .map_err(map_review_repository_error)?;
        Ok(review_distribution(&ratings))
    }

    async fn reward_tallies(&self) -> Result<Vec<RewardTally>, Error> {
        let outcomes = self
            .ledger
            .list_since(None)
            .await
            .map_err(map_ledger_error)?;
        Ok(reward_tallies(&outcomes))
    }

    async fn dashboard(&self) -> Result<Dashboard, Error> {
        Ok(Dashboard {
            spins: self.spins_over_time(AnalyticsPeriod::Daily).await?,
            reviews: self.review_distribution().await?,
            rewards: self.reward_tallies().await?,
        })
    }
}
