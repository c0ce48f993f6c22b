//! Reward administration service.
//!
//! Implements the reward admin driving ports on top of a
//! [`RewardRepository`]. Identity and creation time are assigned here so the
//! allocation pool order stays stable across edits.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{RewardAdminCommand, RewardAdminQuery, RewardInput, RewardRepository};
use crate::domain::spin_service::map_reward_repository_error;
use crate::domain::{Error, RewardDefinition, RewardDraft, RewardId, RewardValidationError};

fn invalid_reward(error: RewardValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_reward",
    }))
}

fn reward_not_found(id: RewardId) -> Error {
    Error::not_found(format!("reward {id} not found"))
}

/// Reward service implementing [`RewardAdminCommand`] and [`RewardAdminQuery`].
pub struct RewardService<R: ?Sized> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> RewardService<R> {
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

impl<R> RewardService<R>
where
    R: RewardRepository + ?Sized,
{
    async fn load(&self, id: RewardId) -> Result<RewardDefinition, Error> {
        self.repository
            .find_by_id(&id)
            .await
            .map_err(map_reward_repository_error)?
            .ok_or_else(|| reward_not_found(id))
    }
}

#[async_trait]
impl<R> RewardAdminCommand for RewardService<R>
where
    R: RewardRepository + ?Sized,
{
    async fn create_reward(&self, input: RewardInput) -> Result<RewardDefinition, Error> {
        let RewardInput {
            name,
            description,
            kind,
            expiry_days,
            requires_review,
        } = input;
        let reward = RewardDefinition::new(RewardDraft {
            id: RewardId::random(),
            name,
            description,
            kind,
            expiry_days,
            requires_review,
            created_at: self.clock.utc(),
        })
        .map_err(invalid_reward)?;

        self.repository
            .insert(&reward)
            .await
            .map_err(map_reward_repository_error)?;
        info!(reward_id = %reward.id(), name = reward.name(), "reward created");
        Ok(reward)
    }

    async fn update_reward(
        &self,
        id: RewardId,
        input: RewardInput,
    ) -> Result<RewardDefinition, Error> {
        let existing = self.load(id).await?;
        let RewardInput {
            name,
            description,
            kind,
            expiry_days,
            requires_review,
        } = input;
        let reward = RewardDefinition::new(RewardDraft {
            id,
            name,
            description,
            kind,
            expiry_days,
            requires_review,
            created_at: existing.created_at(),
        })
        .map_err(invalid_reward)?;

        let updated = self
            .repository
            .update(&reward)
            .await
            .map_err(map_reward_repository_error)?;
        if !updated {
            return Err(reward_not_found(id));
        }
        info!(reward_id = %id, stock = ?reward.stock(), "reward updated");
        Ok(reward)
    }

    async fn delete_reward(&self, id: RewardId) -> Result<(), Error> {
        let deleted = self
            .repository
            .delete(&id)
            .await
            .map_err(map_reward_repository_error)?;
        if !deleted {
            return Err(reward_not_found(id));
        }
        info!(reward_id = %id, "reward deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> RewardAdminQuery for RewardService<R>
where
    R: RewardRepository + ?Sized,
{
    async fn list_rewards(&self) -> Result<Vec<RewardDefinition>, Error> {
        self.repository
            .list_all()
            .await
            .map_err(map_reward_repository_error)
    }

    async fn get_reward(&self, id: RewardId) -> Result<RewardDefinition, Error> {
        self.load(id).await
    }
}

#[cfg(test)]
#[path = "reward_service_tests.rs"]
mod tests;
