//! Driving port for managing the rewards on the wheel.

use async_trait::async_trait;

use crate::domain::{Error, RewardDefinition, RewardId, RewardKind};

/// Mutable reward fields supplied by an administrator.
///
/// Identity and `created_at` are assigned by the service on creation and
/// kept on update.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardInput {
    pub name: String,
    pub description: String,
    pub kind: RewardKind,
    pub expiry_days: Option<u32>,
    pub requires_review: bool,
}

/// Driving port for reward write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardAdminCommand: Send + Sync {
    /// Validate and store a new reward.
    async fn create_reward(&self, input: RewardInput) -> Result<RewardDefinition, Error>;

    /// Replace the mutable fields of a reward. Setting a new stock restocks
    /// the prize.
    async fn update_reward(
        &self,
        id: RewardId,
        input: RewardInput,
    ) -> Result<RewardDefinition, Error>;

    /// Remove a reward. Outcomes that awarded it keep their snapshot.
    async fn delete_reward(&self, id: RewardId) -> Result<(), Error>;
}
