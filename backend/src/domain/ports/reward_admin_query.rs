//! Driving port for reading reward definitions.

use async_trait::async_trait;

use crate::domain::{Error, RewardDefinition, RewardId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardAdminQuery: Send + Sync {
    /// Every reward in creation order.
    async fn list_rewards(&self) -> Result<Vec<RewardDefinition>, Error>;

    async fn get_reward(&self, id: RewardId) -> Result<RewardDefinition, Error>;
}
