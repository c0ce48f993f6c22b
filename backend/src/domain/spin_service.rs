//! Spin orchestration: eligibility, weighted selection, redemption codes,
//! atomic recording with bounded retries, and the claim state machine.
//!
//! The service never mutates stock itself. It asks the ledger to record an
//! outcome and reacts to the [`RecordOutcome`] it gets back, retrying against
//! a fresh pool when another spin took the last unit first.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use crate::domain::ports::{
    ClaimSpinRequest, ClaimSpinResponse, RecordOutcome, ReviewRepository, ReviewRepositoryError,
    RewardRepository, RewardRepositoryError, SpinCommand, SpinLedger, SpinLedgerError, SpinQuery,
    SpinRequest, SpinResponse,
};
use crate::domain::{
    AllocationError, ClaimError, Error, ParticipantKind, ParticipantRef, RandomCodeGenerator,
    RedemptionCode, RedemptionCodeGenerator, ReviewId, RewardDraw, SpinId, SpinOutcome,
    ThreadRngDraw, select,
};

/// Retry limits for a single spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinPolicy {
    /// Selections attempted before giving up with `NoPrize`.
    pub max_allocation_attempts: u32,
    /// Redemption codes generated per selection before giving up on it.
    pub max_code_attempts: u32,
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self {
            max_allocation_attempts: 5,
            max_code_attempts: 8,
        }
    }
}

/// Port bundle required by the spin service.
#[derive(Clone)]
pub struct SpinServicePorts {
    pub rewards: Arc<dyn RewardRepository>,
    pub ledger: Arc<dyn SpinLedger>,
    pub reviews: Arc<dyn ReviewRepository>,
}

impl SpinServicePorts {
    pub fn new(
        rewards: Arc<dyn RewardRepository>,
        ledger: Arc<dyn SpinLedger>,
        reviews: Arc<dyn ReviewRepository>,
    ) -> Self {
        Self {
            rewards,
            ledger,
            reviews,
        }
    }
}

/// Randomness used by the spin service.
#[derive(Clone)]
pub struct SpinServiceRuntime {
    pub draw: Arc<dyn RewardDraw>,
    pub codes: Arc<dyn RedemptionCodeGenerator>,
}

impl Default for SpinServiceRuntime {
    fn default() -> Self {
        Self {
            draw: Arc::new(ThreadRngDraw),
            codes: Arc::new(RandomCodeGenerator),
        }
    }
}

pub(crate) fn map_reward_repository_error(error: RewardRepositoryError) -> Error {
    match error {
        RewardRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reward repository unavailable: {message}"))
        }
        RewardRepositoryError::Query { message } => {
            Error::internal(format!("reward repository error: {message}"))
        }
        RewardRepositoryError::DuplicateCouponCode { coupon_code } => {
            Error::conflict(format!("coupon code {coupon_code} is already in use"))
                .with_reason("duplicate_coupon_code")
        }
    }
}

pub(crate) fn map_ledger_error(error: SpinLedgerError) -> Error {
    match error {
        SpinLedgerError::Connection { message } => {
            Error::service_unavailable(format!("spin ledger unavailable: {message}"))
        }
        SpinLedgerError::Query { message } => {
            Error::internal(format!("spin ledger error: {message}"))
        }
    }
}

pub(crate) fn map_review_repository_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
        ReviewRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("a review for {email} has already been submitted"))
                .with_reason("already_submitted")
        }
    }
}

fn already_participated(participant: ParticipantRef) -> Error {
    Error::conflict(format!("{participant} has already spun"))
        .with_reason("already_participated")
}

fn claim_refused(error: ClaimError) -> Error {
    Error::conflict(error.to_string()).with_reason(error.code())
}

fn review_required() -> Error {
    Error::forbidden("this prize can only be claimed after submitting a review")
        .with_reason("review_required")
}

/// Spin service implementing [`SpinCommand`] and [`SpinQuery`].
#[derive(Clone)]
pub struct SpinService {
    rewards: Arc<dyn RewardRepository>,
    ledger: Arc<dyn SpinLedger>,
    reviews: Arc<dyn ReviewRepository>,
    clock: Arc<dyn Clock>,
    draw: Arc<dyn RewardDraw>,
    codes: Arc<dyn RedemptionCodeGenerator>,
    policy: SpinPolicy,
}

impl SpinService {
    /// Build a service drawing from the thread-local RNG.
    ///
    /// ```rust,ignore
    /// let service = SpinService::new(ports, Arc::new(DefaultClock), SpinPolicy::default());
    /// ```
    pub fn new(ports: SpinServicePorts, clock: Arc<dyn Clock>, policy: SpinPolicy) -> Self {
        Self::with_runtime(ports, clock, SpinServiceRuntime::default(), policy)
    }

    /// Build a service with injected randomness.
    pub fn with_runtime(
        ports: SpinServicePorts,
        clock: Arc<dyn Clock>,
        runtime: SpinServiceRuntime,
        policy: SpinPolicy,
    ) -> Self {
        Self {
            rewards: ports.rewards,
            ledger: ports.ledger,
            reviews: ports.reviews,
            clock,
            draw: runtime.draw,
            codes: runtime.codes,
            policy,
        }
    }

    /// Build a service with the system clock and default randomness.
    pub fn with_defaults(ports: SpinServicePorts) -> Self {
        Self::new(ports, Arc::new(DefaultClock), SpinPolicy::default())
    }

    async fn ensure_review_exists(&self, participant: ParticipantRef) -> Result<(), Error> {
        if participant.kind != ParticipantKind::Review {
            return Ok(());
        }
        let review_id = ReviewId::from_uuid(participant.id);
        self.reviews
            .find_by_id(&review_id)
            .await
            .map_err(map_review_repository_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("review {review_id} not found")))
    }

    async fn ensure_review_feedback(&self, participant: ParticipantRef) -> Result<(), Error> {
        if participant.kind != ParticipantKind::Review {
            return Err(review_required());
        }
        let review = self
            .reviews
            .find_by_id(&ReviewId::from_uuid(participant.id))
            .await
            .map_err(map_review_repository_error)?;
        match review {
            Some(review) if review.has_feedback() => Ok(()),
            _ => Err(review_required()),
        }
    }

    /// Generate a code no stored outcome carries yet, or `None` when every
    /// attempt collided.
    async fn fresh_code(&self) -> Result<Option<RedemptionCode>, Error> {
        for _ in 0..self.policy.max_code_attempts.max(1) {
            let code = self.codes.generate();
            let taken = self
                .ledger
                .code_exists(&code)
                .await
                .map_err(map_ledger_error)?;
            if !taken {
                return Ok(Some(code));
            }
            warn!("generated redemption code already issued; regenerating");
        }
        Ok(None)
    }
}

#[async_trait]
impl SpinCommand for SpinService {
    async fn spin(&self, request: SpinRequest) -> Result<SpinResponse, Error> {
        let participant = request.participant;
        self.ensure_review_exists(participant).await?;

        let existing = self
            .ledger
            .find_by_participant(&participant)
            .await
            .map_err(map_ledger_error)?;
        if existing.is_some() {
            return Err(already_participated(participant));
        }

        let max_attempts = self.policy.max_allocation_attempts.max(1);
        for attempt in 1..=max_attempts {
            let pool = self
                .rewards
                .list_eligible()
                .await
                .map_err(map_reward_repository_error)?;
            let reward = match select(&pool, self.draw.as_ref()) {
                Ok(reward) => reward,
                Err(AllocationError::InventoryExhausted) => {
                    info!(%participant, "reward inventory exhausted");
                    return Ok(SpinResponse::NoPrize);
                }
            };

            let now = self.clock.utc();
            let outcome = if reward.is_prize() {
                let Some(code) = self.fresh_code().await? else {
                    warn!(%participant, attempt, "no unused redemption code found");
                    continue;
                };
                SpinOutcome::won(participant, reward, code, now)
                    .ok_or_else(|| Error::internal("selected prize carries no coupon code"))?
            } else {
                SpinOutcome::try_again(participant, now)
            };

            match self.ledger.record(&outcome).await.map_err(map_ledger_error)? {
                RecordOutcome::Recorded => {
                    info!(
                        %participant,
                        spin_id = %outcome.id(),
                        reward_id = %reward.id(),
                        won = outcome.prize().is_some(),
                        "spin recorded"
                    );
                    return Ok(if outcome.prize().is_some() {
                        SpinResponse::Won { outcome }
                    } else {
                        SpinResponse::TryAgain { outcome }
                    });
                }
                RecordOutcome::StockDepleted => {
                    warn!(%participant, attempt, reward_id = %reward.id(), "reward stock taken concurrently");
                }
                RecordOutcome::CodeTaken => {
                    warn!(%participant, attempt, "redemption code issued concurrently");
                }
                RecordOutcome::AlreadyParticipated => {
                    return Err(already_participated(participant));
                }
            }
        }

        warn!(%participant, max_attempts, "allocation attempts exhausted");
        Ok(SpinResponse::NoPrize)
    }

    async fn claim(&self, request: ClaimSpinRequest) -> Result<ClaimSpinResponse, Error> {
        let spin_id = request.spin_id;
        let outcome = self
            .ledger
            .find_by_id(&spin_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| Error::not_found(format!("spin {spin_id} not found")))?;

        let now = self.clock.utc();
        outcome.ensure_claimable(now).map_err(claim_refused)?;
        if outcome.prize().is_some_and(|prize| prize.requires_review) {
            self.ensure_review_feedback(outcome.participant()).await?;
        }

        let claimed = outcome.claim(now).map_err(claim_refused)?;
        let updated = self
            .ledger
            .mark_claimed(&spin_id, now)
            .await
            .map_err(map_ledger_error)?;
        if !updated {
            warn!(%spin_id, "claim lost to a concurrent claim");
            return Err(claim_refused(ClaimError::AlreadyClaimed));
        }

        info!(%spin_id, "prize claimed");
        Ok(ClaimSpinResponse { outcome: claimed })
    }
}

#[async_trait]
impl SpinQuery for SpinService {
    async fn get_spin(&self, spin_id: SpinId) -> Result<SpinOutcome, Error> {
        self.ledger
            .find_by_id(&spin_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| Error::not_found(format!("spin {spin_id} not found")))
    }
}

#[cfg(test)]
#[path = "spin_service_tests.rs"]
mod tests;
