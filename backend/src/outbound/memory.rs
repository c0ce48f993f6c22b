//! In-process store implementing every driven port.
//!
//! Used when no database is configured and by the integration tests. All
//! state sits behind one mutex, so [`SpinLedger::record`] takes stock and
//! appends the outcome as a single step, matching the transactional
//! behaviour of the PostgreSQL adapter.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    RecordOutcome, ReviewListQuery, ReviewPage, ReviewRepository, ReviewRepositoryError,
    RewardRepository, RewardRepositoryError, SpinLedger, SpinLedgerError,
};
use crate::domain::{
    ClaimStatus, FeedbackStatus, ParticipantRef, Rating, RedemptionCode, Review, ReviewId,
    RewardDefinition, RewardId, SpinId, SpinOutcome, SpinOutcomeDraft,
};

#[derive(Debug, Default)]
struct MemoryState {
    rewards: Vec<RewardDefinition>,
    outcomes: Vec<SpinOutcome>,
    reviews: Vec<Review>,
}

impl MemoryState {
    fn coupon_in_use(&self, reward: &RewardDefinition) -> bool {
        let Some(code) = reward.coupon_code() else {
            return false;
        };
        self.rewards
            .iter()
            .any(|other| other.id() != reward.id() && other.coupon_code() == Some(code))
    }

    fn sort_rewards(&mut self) {
        self.rewards
            .sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(&b.id())));
    }
}

/// Mutex-guarded store for rewards, spin outcomes and reviews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remaining stock of a prize, for inspection in tests and tooling.
    pub fn stock_of(&self, id: &RewardId) -> Option<u32> {
        self.state()
            .rewards
            .iter()
            .find(|reward| reward.id() == *id)
            .and_then(RewardDefinition::stock)
    }
}

#[async_trait]
impl RewardRepository for MemoryStore {
    async fn insert(&self, reward: &RewardDefinition) -> Result<(), RewardRepositoryError> {
        let mut state = self.state();
        if state.coupon_in_use(reward) {
            let code = reward.coupon_code().map(|c| c.as_str()).unwrap_or_default();
            return Err(RewardRepositoryError::duplicate_coupon_code(code));
        }
        state.rewards.push(reward.clone());
        state.sort_rewards();
        Ok(())
    }

    async fn update(&self, reward: &RewardDefinition) -> Result<bool, RewardRepositoryError> {
        let mut state = self.state();
        if state.coupon_in_use(reward) {
            let code = reward.coupon_code().map(|c| c.as_str()).unwrap_or_default();
            return Err(RewardRepositoryError::duplicate_coupon_code(code));
        }
        let Some(slot) = state.rewards.iter_mut().find(|r| r.id() == reward.id()) else {
            return Ok(false);
        };
        *slot = reward.clone();
        state.sort_rewards();
        Ok(true)
    }

    async fn delete(&self, id: &RewardId) -> Result<bool, RewardRepositoryError> {
        let mut state = self.state();
        let before = state.rewards.len();
        state.rewards.retain(|reward| reward.id() != *id);
        Ok(state.rewards.len() != before)
    }

    async fn find_by_id(
        &self,
        id: &RewardId,
    ) -> Result<Option<RewardDefinition>, RewardRepositoryError> {
        Ok(self.state().rewards.iter().find(|r| r.id() == *id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<RewardDefinition>, RewardRepositoryError> {
        Ok(self.state().rewards.clone())
    }

    async fn list_eligible(&self) -> Result<Vec<RewardDefinition>, RewardRepositoryError> {
        Ok(self
            .state()
            .rewards
            .iter()
            .filter(|reward| reward.is_eligible())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SpinLedger for MemoryStore {
    async fn find_by_id(&self, id: &SpinId) -> Result<Option<SpinOutcome>, SpinLedgerError> {
        Ok(self.state().outcomes.iter().find(|o| o.id() == *id).cloned())
    }

    async fn find_by_participant(
        &self,
        participant: &ParticipantRef,
    ) -> Result<Option<SpinOutcome>, SpinLedgerError> {
        Ok(self
            .state()
            .outcomes
            .iter()
            .find(|o| o.participant() == *participant)
            .cloned())
    }

    async fn code_exists(&self, code: &RedemptionCode) -> Result<bool, SpinLedgerError> {
        Ok(self
            .state()
            .outcomes
            .iter()
            .any(|o| o.redemption_code() == Some(code)))
    }

    async fn record(&self, outcome: &SpinOutcome) -> Result<RecordOutcome, SpinLedgerError> {
        let mut state = self.state();
        if state
            .outcomes
            .iter()
            .any(|o| o.participant() == outcome.participant())
        {
            return Ok(RecordOutcome::AlreadyParticipated);
        }
        let code_taken = outcome.redemption_code().is_some_and(|code| {
            state
                .outcomes
                .iter()
                .any(|o| o.redemption_code() == Some(code))
        });
        if code_taken {
            return Ok(RecordOutcome::CodeTaken);
        }
        if let Some(prize) = outcome.prize() {
            let taken = state
                .rewards
                .iter_mut()
                .find(|reward| reward.id() == prize.reward_id)
                .is_some_and(RewardDefinition::take_one);
            if !taken {
                return Ok(RecordOutcome::StockDepleted);
            }
        }
        state.outcomes.push(outcome.clone());
        Ok(RecordOutcome::Recorded)
    }

    async fn mark_claimed(
        &self,
        id: &SpinId,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool, SpinLedgerError> {
        let mut state = self.state();
        let Some(slot) = state
            .outcomes
            .iter_mut()
            .find(|o| o.id() == *id && o.status() == ClaimStatus::Pending)
        else {
            return Ok(false);
        };
        let claimed = SpinOutcome::restore(SpinOutcomeDraft {
            status: ClaimStatus::Claimed,
            claimed_at: Some(claimed_at),
            ..slot.to_draft()
        })
        .map_err(|err| SpinLedgerError::query(err.to_string()))?;
        *slot = claimed;
        Ok(true)
    }

    async fn list_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SpinOutcome>, SpinLedgerError> {
        let mut outcomes: Vec<SpinOutcome> = self
            .state()
            .outcomes
            .iter()
            .filter(|o| since.is_none_or(|since| o.created_at() >= since))
            .cloned()
            .collect();
        outcomes.sort_by_key(SpinOutcome::created_at);
        Ok(outcomes)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut state = self.state();
        if state.reviews.iter().any(|r| r.email() == review.email()) {
            return Err(ReviewRepositoryError::duplicate_email(review.email().as_str()));
        }
        state.reviews.push(review.clone());
        Ok(())
    }

    async fn update(
        &self,
        review: &Review,
        expected_status: FeedbackStatus,
    ) -> Result<bool, ReviewRepositoryError> {
        let mut state = self.state();
        let Some(slot) = state
            .reviews
            .iter_mut()
            .find(|r| r.id() == review.id() && r.feedback_status() == expected_status)
        else {
            return Ok(false);
        };
        *slot = review.clone();
        Ok(true)
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(self.state().reviews.iter().find(|r| r.id() == *id).cloned())
    }

    async fn list(&self, query: &ReviewListQuery) -> Result<ReviewPage, ReviewRepositoryError> {
        let mut matching: Vec<Review> = self
            .state()
            .reviews
            .iter()
            .filter(|r| query.since.is_none_or(|since| r.created_at() >= since))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(offset).take(limit).collect();
        Ok(ReviewPage { total, items })
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>, ReviewRepositoryError> {
        Ok(self.state().reviews.iter().filter_map(Review::rating).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{ParticipantKind, ReviewDraft};
    use crate::test_support::{prize, try_again_slice};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn participant() -> ParticipantRef {
        ParticipantRef::new(ParticipantKind::Session, Uuid::new_v4())
    }

    fn code(raw: &str) -> RedemptionCode {
        RedemptionCode::new(raw).expect("valid code")
    }

    fn review(email: &str, at: DateTime<Utc>) -> Review {
        Review::new(ReviewDraft {
            id: ReviewId::random(),
            name: "Ada".to_owned(),
            email: email.to_owned(),
            phone: None,
            rating: None,
            comment: None,
            feedback_status: FeedbackStatus::Pending,
            created_at: at,
        })
        .expect("valid review")
    }

    #[rstest]
    #[tokio::test]
    async fn record_takes_stock_until_empty(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let reward = prize("Mug", 1, now);
        RewardRepository::insert(&store, &reward)
            .await
            .expect("insert");

        let first = SpinOutcome::won(participant(), &reward, code("AAAA0001"), now)
            .expect("prize outcome");
        let second = SpinOutcome::won(participant(), &reward, code("AAAA0002"), now)
            .expect("prize outcome");

        assert_eq!(store.record(&first).await, Ok(RecordOutcome::Recorded));
        assert_eq!(store.record(&second).await, Ok(RecordOutcome::StockDepleted));
        assert_eq!(store.stock_of(&reward.id()), Some(0));
        assert!(store.list_eligible().await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn record_rejects_duplicate_participant_and_code(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let reward = prize("Mug", 5, now);
        RewardRepository::insert(&store, &reward)
            .await
            .expect("insert");
        let who = participant();
        let first = SpinOutcome::won(who, &reward, code("AAAA0001"), now).expect("prize");
        store.record(&first).await.expect("record");

        let same_participant = SpinOutcome::try_again(who, now);
        let same_code =
            SpinOutcome::won(participant(), &reward, code("AAAA0001"), now).expect("prize");

        assert_eq!(
            store.record(&same_participant).await,
            Ok(RecordOutcome::AlreadyParticipated)
        );
        assert_eq!(store.record(&same_code).await, Ok(RecordOutcome::CodeTaken));
        assert_eq!(store.stock_of(&reward.id()), Some(4));
    }

    #[rstest]
    #[tokio::test]
    async fn mark_claimed_only_moves_pending(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let reward = prize("Mug", 1, now);
        RewardRepository::insert(&store, &reward)
            .await
            .expect("insert");
        let outcome = SpinOutcome::won(participant(), &reward, code("AAAA0001"), now)
            .expect("prize");
        store.record(&outcome).await.expect("record");

        assert_eq!(store.mark_claimed(&outcome.id(), now).await, Ok(true));
        assert_eq!(store.mark_claimed(&outcome.id(), now).await, Ok(false));
        let stored = SpinLedger::find_by_id(&store, &outcome.id())
            .await
            .expect("lookup")
            .expect("stored outcome");
        assert_eq!(stored.claimed_at(), Some(now));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_coupon_codes_are_rejected(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        RewardRepository::insert(&store, &prize("Mug", 1, now))
            .await
            .expect("insert");

        let result = RewardRepository::insert(&store, &prize("Mug", 3, now)).await;

        assert_eq!(
            result,
            Err(RewardRepositoryError::duplicate_coupon_code("MUG"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn rewards_are_listed_in_creation_order(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let late = prize("Tote", 1, now + Duration::seconds(5));
        let early = try_again_slice(2.0, now);
        RewardRepository::insert(&store, &late).await.expect("insert");
        RewardRepository::insert(&store, &early).await.expect("insert");

        let names: Vec<String> = store
            .list_all()
            .await
            .expect("list")
            .iter()
            .map(|reward| reward.name().to_owned())
            .collect();

        assert_eq!(names, vec!["Try again".to_owned(), "Tote".to_owned()]);
    }

    #[rstest]
    #[tokio::test]
    async fn reviews_page_newest_first(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        for (index, email) in ["a@x.io", "b@x.io", "c@x.io"].into_iter().enumerate() {
            let at = now + Duration::minutes(i64::try_from(index).expect("small index"));
            ReviewRepository::insert(&store, &review(email, at))
                .await
                .expect("insert");
        }

        let page = store
            .list(&ReviewListQuery {
                since: None,
                limit: 2,
                offset: 1,
            })
            .await
            .expect("list");

        assert_eq!(page.total, 3);
        let emails: Vec<&str> = page.items.iter().map(|r| r.email().as_str()).collect();
        assert_eq!(emails, vec!["b@x.io", "a@x.io"]);
    }

    #[rstest]
    #[tokio::test]
    async fn review_update_checks_expected_status(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let stored = review("a@x.io", now);
        ReviewRepository::insert(&store, &stored).await.expect("insert");
        let rating = Rating::new(4).expect("valid rating");
        let next = stored.with_feedback(rating, None).expect("transition");

        assert_eq!(
            ReviewRepository::update(&store, &next, FeedbackStatus::Submitted).await,
            Ok(false)
        );
        assert_eq!(
            ReviewRepository::update(&store, &next, FeedbackStatus::Pending).await,
            Ok(true)
        );
        assert_eq!(store.list_ratings().await, Ok(vec![rating]));
    }
}
