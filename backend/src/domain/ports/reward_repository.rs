//! Port for reward definition persistence.

use async_trait::async_trait;

use crate::domain::{RewardDefinition, RewardId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reward repository adapters.
    pub enum RewardRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reward repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "reward repository query failed: {message}",
        /// Another reward already uses the coupon code.
        DuplicateCouponCode { coupon_code: String } =>
            "coupon code {coupon_code} is already in use",
    }
}

/// Storage for the rewards that make up the wheel.
///
/// Listings are ordered by `created_at`, then id, so the allocator sees a
/// stable pool.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardRepository: Send + Sync {
    /// Store a new reward.
    async fn insert(&self, reward: &RewardDefinition) -> Result<(), RewardRepositoryError>;

    /// Replace the stored reward with the same id. Returns `false` when no
    /// such reward exists.
    async fn update(&self, reward: &RewardDefinition) -> Result<bool, RewardRepositoryError>;

    /// Remove a reward. Returns `false` when no such reward exists.
    async fn delete(&self, id: &RewardId) -> Result<bool, RewardRepositoryError>;

    async fn find_by_id(
        &self,
        id: &RewardId,
    ) -> Result<Option<RewardDefinition>, RewardRepositoryError>;

    /// Every reward in creation order.
    async fn list_all(&self) -> Result<Vec<RewardDefinition>, RewardRepositoryError>;

    /// The allocation pool: prizes with stock left plus try-again slices, in
    /// creation order.
    async fn list_eligible(&self) -> Result<Vec<RewardDefinition>, RewardRepositoryError>;
}
