//! Driving port for spinning the wheel and claiming prizes.

use async_trait::async_trait;

use crate::domain::{Error, ParticipantRef, SpinId, SpinOutcome};

/// Request to spin once on behalf of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinRequest {
    pub participant: ParticipantRef,
}

/// What a spin produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinResponse {
    /// A prize was awarded and recorded as `pending`.
    Won { outcome: SpinOutcome },
    /// The try-again slice came up; the participant has used their spin.
    TryAgain { outcome: SpinOutcome },
    /// Nothing could be awarded right now. Nothing was recorded, so the
    /// participant may spin again later.
    NoPrize,
}

impl SpinResponse {
    /// The recorded outcome, if any.
    pub fn outcome(&self) -> Option<&SpinOutcome> {
        match self {
            Self::Won { outcome } | Self::TryAgain { outcome } => Some(outcome),
            Self::NoPrize => None,
        }
    }
}

/// Request to claim a won prize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimSpinRequest {
    pub spin_id: SpinId,
}

/// The outcome after a successful claim, coupon code revealed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSpinResponse {
    pub outcome: SpinOutcome,
}

/// Driving port for spin write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpinCommand: Send + Sync {
    /// Draw a reward for the participant and record the outcome.
    ///
    /// A participant that already has an outcome receives a `conflict` error
    /// with reason `already_participated`. An exhausted pool is not an error
    /// and yields [`SpinResponse::NoPrize`].
    async fn spin(&self, request: SpinRequest) -> Result<SpinResponse, Error>;

    /// Move a pending prize to `claimed`.
    ///
    /// Refusals are `conflict` errors with reasons `already_claimed`,
    /// `not_claimable` or `expired`, or `forbidden` with `review_required`
    /// when the prize needs submitted review feedback first.
    async fn claim(&self, request: ClaimSpinRequest) -> Result<ClaimSpinResponse, Error>;
}
