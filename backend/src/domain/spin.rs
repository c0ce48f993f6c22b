//! Spin outcomes and their claim lifecycle.
//!
//! Outcomes are stored already settled: a winning spin starts `pending`, a
//! try-again spin is `not_eligible` from the start. Only `pending` moves on,
//! and only to `claimed`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CouponCode, RedemptionCode, RewardDefinition, RewardId};

/// Stable spin outcome identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpinId(Uuid);

impl SpinId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SpinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unknown label for one of the stored enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseLabelError {
    kind: &'static str,
    value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// What originated a spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    /// A submitted review.
    Review,
    /// A known customer account.
    Customer,
    /// An anonymous browser session.
    Session,
}

impl ParticipantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Customer => "customer",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantKind {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review" => Ok(Self::Review),
            "customer" => Ok(Self::Customer),
            "session" => Ok(Self::Session),
            other => Err(ParseLabelError::new("participant kind", other)),
        }
    }
}

/// Reference to the entity a spin is recorded against. Each reference spins
/// at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRef {
    pub kind: ParticipantKind,
    pub id: Uuid,
}

impl ParticipantRef {
    pub fn new(kind: ParticipantKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ParticipantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Claim lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Claimed,
    NotEligible,
}

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::NotEligible => "not_eligible",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "claimed" => Ok(Self::Claimed),
            "not_eligible" => Ok(Self::NotEligible),
            other => Err(ParseLabelError::new("claim status", other)),
        }
    }
}

/// Snapshot of the reward at the moment it was won.
///
/// Outcomes keep this copy so later edits or deletion of the reward do not
/// rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardedPrize {
    pub reward_id: RewardId,
    pub name: String,
    pub description: String,
    pub coupon_code: CouponCode,
    pub requires_review: bool,
}

impl AwardedPrize {
    /// Snapshot a prize; `None` for the try-again slice.
    pub fn from_reward(reward: &RewardDefinition) -> Option<Self> {
        reward.coupon_code().map(|coupon_code| Self {
            reward_id: reward.id(),
            name: reward.name().to_owned(),
            description: reward.description().to_owned(),
            coupon_code: coupon_code.clone(),
            requires_review: reward.requires_review(),
        })
    }
}

/// Inconsistent outcome data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpinOutcomeError {
    #[error("a prize outcome must carry a redemption code and vice versa")]
    CodeWithoutPrize,
    #[error("status {status} does not match the presence of a prize")]
    StatusMismatch { status: ClaimStatus },
    #[error("claimed_at must be set exactly when the outcome is claimed")]
    ClaimTimestampMismatch,
}

/// Reasons a claim is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("this prize has already been claimed")]
    AlreadyClaimed,
    #[error("this spin did not win a prize")]
    NotClaimable,
    #[error("this prize has expired")]
    Expired,
}

impl ClaimError {
    /// Stable reason code for adapters.
    pub fn code(self) -> &'static str {
        match self {
            Self::AlreadyClaimed => "already_claimed",
            Self::NotClaimable => "not_claimable",
            Self::Expired => "expired",
        }
    }
}

/// Raw fields used to rebuild an outcome from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcomeDraft {
    pub id: SpinId,
    pub participant: ParticipantRef,
    pub prize: Option<AwardedPrize>,
    pub redemption_code: Option<RedemptionCode>,
    pub status: ClaimStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

/// Recorded result of one spin.
///
/// ## Invariants
/// - A prize is present exactly when a redemption code is present.
/// - `not_eligible` exactly when there is no prize.
/// - `claimed_at` is set exactly when the status is `claimed`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    id: SpinId,
    participant: ParticipantRef,
    prize: Option<AwardedPrize>,
    redemption_code: Option<RedemptionCode>,
    status: ClaimStatus,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    claimed_at: Option<DateTime<Utc>>,
}

impl SpinOutcome {
    /// Build a `pending` outcome for a drawn prize, or `None` when `reward`
    /// is the try-again slice.
    pub fn won(
        participant: ParticipantRef,
        reward: &RewardDefinition,
        code: RedemptionCode,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let prize = AwardedPrize::from_reward(reward)?;
        Some(Self {
            id: SpinId::random(),
            participant,
            prize: Some(prize),
            redemption_code: Some(code),
            status: ClaimStatus::Pending,
            expires_at: reward.expiry_from(now),
            created_at: now,
            claimed_at: None,
        })
    }

    /// Build a terminal `not_eligible` outcome.
    pub fn try_again(participant: ParticipantRef, now: DateTime<Utc>) -> Self {
        Self {
            id: SpinId::random(),
            participant,
            prize: None,
            redemption_code: None,
            status: ClaimStatus::NotEligible,
            expires_at: None,
            created_at: now,
            claimed_at: None,
        }
    }

    /// Rebuild an outcome from stored fields, checking the invariants.
    pub fn restore(draft: SpinOutcomeDraft) -> Result<Self, SpinOutcomeError> {
        let SpinOutcomeDraft {
            id,
            participant,
            prize,
            redemption_code,
            status,
            expires_at,
            created_at,
            claimed_at,
        } = draft;

        if prize.is_some() != redemption_code.is_some() {
            return Err(SpinOutcomeError::CodeWithoutPrize);
        }
        if prize.is_none() != (status == ClaimStatus::NotEligible) {
            return Err(SpinOutcomeError::StatusMismatch { status });
        }
        if claimed_at.is_some() != (status == ClaimStatus::Claimed) {
            return Err(SpinOutcomeError::ClaimTimestampMismatch);
        }

        Ok(Self {
            id,
            participant,
            prize,
            redemption_code,
            status,
            expires_at,
            created_at,
            claimed_at,
        })
    }

    /// Raw fields, the inverse of [`Self::restore`].
    pub fn to_draft(&self) -> SpinOutcomeDraft {
        SpinOutcomeDraft {
            id: self.id,
            participant: self.participant,
            prize: self.prize.clone(),
            redemption_code: self.redemption_code.clone(),
            status: self.status,
            expires_at: self.expires_at,
            created_at: self.created_at,
            claimed_at: self.claimed_at,
        }
    }

    pub fn id(&self) -> SpinId {
        self.id
    }

    pub fn participant(&self) -> ParticipantRef {
        self.participant
    }

    pub fn prize(&self) -> Option<&AwardedPrize> {
        self.prize.as_ref()
    }

    pub fn redemption_code(&self) -> Option<&RedemptionCode> {
        self.redemption_code.as_ref()
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Check that the outcome may move to `claimed` at `now`.
    pub fn ensure_claimable(&self, now: DateTime<Utc>) -> Result<(), ClaimError> {
        match self.status {
            ClaimStatus::Claimed => Err(ClaimError::AlreadyClaimed),
            ClaimStatus::NotEligible => Err(ClaimError::NotClaimable),
            ClaimStatus::Pending if self.is_expired(now) => Err(ClaimError::Expired),
            ClaimStatus::Pending => Ok(()),
        }
    }

    /// Return the claimed version of this outcome.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use uuid::Uuid;
    /// use spinwin::domain::{ClaimError, ParticipantKind, ParticipantRef, SpinOutcome};
    ///
    /// let participant = ParticipantRef::new(ParticipantKind::Session, Uuid::new_v4());
    /// let outcome = SpinOutcome::try_again(participant, Utc::now());
    /// assert_eq!(outcome.claim(Utc::now()), Err(ClaimError::NotClaimable));
    /// ```
    pub fn claim(&self, now: DateTime<Utc>) -> Result<Self, ClaimError> {
        self.ensure_claimable(now)?;
        Ok(Self {
            status: ClaimStatus::Claimed,
            claimed_at: Some(now),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{RewardDraft, RewardKind, SliceWeight};

    fn reward(kind: RewardKind, expiry_days: Option<u32>) -> RewardDefinition {
        RewardDefinition::new(RewardDraft {
            id: RewardId::random(),
            name: "Tote bag".to_owned(),
            description: String::new(),
            kind,
            expiry_days,
            requires_review: false,
            created_at: Utc::now(),
        })
        .expect("valid reward")
    }

    #[fixture]
    fn participant() -> ParticipantRef {
        ParticipantRef::new(ParticipantKind::Customer, Uuid::new_v4())
    }

    #[fixture]
    fn prize() -> RewardDefinition {
        reward(
            RewardKind::Prize {
                coupon_code: CouponCode::new("TOTE").expect("valid coupon"),
                stock: 1,
            },
            Some(3),
        )
    }

    #[fixture]
    fn code() -> RedemptionCode {
        RedemptionCode::new("TOTE0001").expect("valid code")
    }

    #[rstest]
    fn won_snapshots_prize_and_expiry(
        participant: ParticipantRef,
        prize: RewardDefinition,
        code: RedemptionCode,
    ) {
        let now = Utc::now();
        let outcome = SpinOutcome::won(participant, &prize, code, now).expect("prize outcome");
        assert_eq!(outcome.status(), ClaimStatus::Pending);
        assert_eq!(outcome.expires_at(), Some(now + Duration::days(3)));
        assert_eq!(
            outcome.prize().map(|p| p.coupon_code.as_str()),
            Some("TOTE")
        );
    }

    #[rstest]
    fn won_refuses_try_again_slice(participant: ParticipantRef, code: RedemptionCode) {
        let slice = reward(
            RewardKind::TryAgain {
                weight: SliceWeight::new(1.0).expect("valid weight"),
            },
            None,
        );
        assert!(SpinOutcome::won(participant, &slice, code, Utc::now()).is_none());
    }

    #[rstest]
    fn claim_moves_pending_to_claimed_once(
        participant: ParticipantRef,
        prize: RewardDefinition,
        code: RedemptionCode,
    ) {
        let now = Utc::now();
        let outcome = SpinOutcome::won(participant, &prize, code, now).expect("prize outcome");
        let claimed = outcome.claim(now).expect("first claim succeeds");
        assert_eq!(claimed.status(), ClaimStatus::Claimed);
        assert_eq!(claimed.claimed_at(), Some(now));
        assert_eq!(claimed.claim(now), Err(ClaimError::AlreadyClaimed));
    }

    #[rstest]
    fn claim_rejects_expired_prize(
        participant: ParticipantRef,
        prize: RewardDefinition,
        code: RedemptionCode,
    ) {
        let now = Utc::now();
        let outcome = SpinOutcome::won(participant, &prize, code, now).expect("prize outcome");
        assert_eq!(
            outcome.claim(now + Duration::days(3)),
            Err(ClaimError::Expired)
        );
    }

    #[rstest]
    fn restore_rejects_code_without_prize(participant: ParticipantRef, code: RedemptionCode) {
        let result = SpinOutcome::restore(SpinOutcomeDraft {
            id: SpinId::random(),
            participant,
            prize: None,
            redemption_code: Some(code),
            status: ClaimStatus::NotEligible,
            expires_at: None,
            created_at: Utc::now(),
            claimed_at: None,
        });
        assert_eq!(result, Err(SpinOutcomeError::CodeWithoutPrize));
    }

    #[rstest]
    fn restore_rejects_claimed_without_timestamp(
        participant: ParticipantRef,
        prize: RewardDefinition,
        code: RedemptionCode,
    ) {
        let result = SpinOutcome::restore(SpinOutcomeDraft {
            id: SpinId::random(),
            participant,
            prize: AwardedPrize::from_reward(&prize),
            redemption_code: Some(code),
            status: ClaimStatus::Claimed,
            expires_at: None,
            created_at: Utc::now(),
            claimed_at: None,
        });
        assert_eq!(result, Err(SpinOutcomeError::ClaimTimestampMismatch));
    }

    #[rstest]
    #[case("pending", ClaimStatus::Pending)]
    #[case("claimed", ClaimStatus::Claimed)]
    #[case("not_eligible", ClaimStatus::NotEligible)]
    fn claim_status_parses_storage_text(#[case] raw: &str, #[case] expected: ClaimStatus) {
        assert_eq!(raw.parse::<ClaimStatus>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn participant_kind_rejects_unknown_text() {
        assert!("device".parse::<ParticipantKind>().is_err());
    }
}
