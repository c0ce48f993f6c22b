//! Tests for the review service.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockReviewRepository, MockSpinLedger, ReviewPage, ReviewRepositoryError,
};
use crate::domain::{ErrorCode, ReviewWindow};
use crate::test_support::MutableClock;

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 15, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn stored_review(status: FeedbackStatus, now: DateTime<Utc>) -> Review {
    Review::new(ReviewDraft {
        id: ReviewId::random(),
        name: "Grace".to_owned(),
        email: "grace@example.com".to_owned(),
        phone: None,
        rating: (status != FeedbackStatus::Pending).then_some(4),
        comment: None,
        feedback_status: status,
        created_at: now,
    })
    .expect("valid review")
}

fn spun(review: &Review, now: DateTime<Utc>) -> SpinOutcome {
    SpinOutcome::try_again(
        ParticipantRef::new(ParticipantKind::Review, *review.id().as_uuid()),
        now,
    )
}

fn service(
    reviews: MockReviewRepository,
    ledger: MockSpinLedger,
    now: DateTime<Utc>,
) -> ReviewService<MockReviewRepository, MockSpinLedger> {
    ReviewService::new(
        Arc::new(reviews),
        Arc::new(ledger),
        Arc::new(MutableClock::new(now)),
    )
}

#[rstest]
#[tokio::test]
async fn submit_review_normalises_and_stores(now: DateTime<Utc>) {
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_insert()
        .withf(|review| review.email().as_str() == "grace@example.com")
        .times(1)
        .return_once(|_| Ok(()));

    let review = service(reviews, MockSpinLedger::new(), now)
        .submit_review(SubmitReviewRequest {
            name: "Grace".to_owned(),
            email: " Grace@Example.com ".to_owned(),
            phone: Some("+44 20 7946 0000".to_owned()),
        })
        .await
        .expect("review stored");

    assert_eq!(review.feedback_status(), FeedbackStatus::Pending);
    assert_eq!(review.created_at(), now);
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_already_submitted(now: DateTime<Utc>) {
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_insert()
        .return_once(|_| Err(ReviewRepositoryError::duplicate_email("grace@example.com")));

    let error = service(reviews, MockSpinLedger::new(), now)
        .submit_review(SubmitReviewRequest {
            name: "Grace".to_owned(),
            email: "grace@example.com".to_owned(),
            phone: None,
        })
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.reason(), Some("already_submitted"));
}

#[rstest]
#[tokio::test]
async fn invalid_email_names_the_field(now: DateTime<Utc>) {
    let mut reviews = MockReviewRepository::new();
    reviews.expect_insert().times(0);

    let error = service(reviews, MockSpinLedger::new(), now)
        .submit_review(SubmitReviewRequest {
            name: "Grace".to_owned(),
            email: "not-an-email".to_owned(),
            phone: None,
        })
        .await
        .expect_err("invalid email");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|details| details.get("field")),
        Some(&serde_json::json!("email"))
    );
}

#[rstest]
#[tokio::test]
async fn feedback_after_spin_is_recorded(now: DateTime<Utc>) {
    let review = stored_review(FeedbackStatus::Pending, now);
    let outcome = spun(&review, now);
    let review_id = review.id();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(review)));
    reviews
        .expect_update()
        .withf(|review, expected| {
            *expected == FeedbackStatus::Pending
                && review.feedback_status() == FeedbackStatus::Submitted
        })
        .times(1)
        .return_once(|_, _| Ok(true));
    let mut ledger = MockSpinLedger::new();
    ledger
        .expect_find_by_participant()
        .return_once(move |_| Ok(Some(outcome)));

    let updated = service(reviews, ledger, now)
        .submit_feedback(SubmitFeedbackRequest {
            review_id,
            rating: 5,
            comment: Some("  Great coffee  ".to_owned()),
        })
        .await
        .expect("feedback stored");

    assert_eq!(updated.rating().map(Rating::value), Some(5));
    assert_eq!(updated.comment(), Some("Great coffee"));
}

#[rstest]
#[tokio::test]
async fn feedback_before_spin_is_refused(now: DateTime<Utc>) {
    let review = stored_review(FeedbackStatus::Pending, now);
    let review_id = review.id();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(review)));
    reviews.expect_update().times(0);
    let mut ledger = MockSpinLedger::new();
    ledger.expect_find_by_participant().return_once(|_| Ok(None));

    let error = service(reviews, ledger, now)
        .submit_feedback(SubmitFeedbackRequest {
            review_id,
            rating: 4,
            comment: None,
        })
        .await
        .expect_err("not spun yet");

    assert_eq!(error.reason(), Some("spin_required"));
}

#[rstest]
#[case(0)]
#[case(6)]
#[tokio::test]
async fn out_of_range_rating_is_invalid(now: DateTime<Utc>, #[case] rating: u8) {
    let mut reviews = MockReviewRepository::new();
    reviews.expect_find_by_id().times(0);

    let error = service(reviews, MockSpinLedger::new(), now)
        .submit_feedback(SubmitFeedbackRequest {
            review_id: ReviewId::random(),
            rating,
            comment: None,
        })
        .await
        .expect_err("invalid rating");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn second_feedback_is_refused(now: DateTime<Utc>) {
    let review = stored_review(FeedbackStatus::Submitted, now);
    let outcome = spun(&review, now);
    let review_id = review.id();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(review)));
    reviews.expect_update().times(0);
    let mut ledger = MockSpinLedger::new();
    ledger
        .expect_find_by_participant()
        .return_once(move |_| Ok(Some(outcome)));

    let error = service(reviews, ledger, now)
        .submit_feedback(SubmitFeedbackRequest {
            review_id,
            rating: 2,
            comment: None,
        })
        .await
        .expect_err("already submitted");

    assert_eq!(error.reason(), Some("feedback_already_submitted"));
}

#[rstest]
#[tokio::test]
async fn concurrent_feedback_loses_the_status_check(now: DateTime<Utc>) {
    let review = stored_review(FeedbackStatus::Pending, now);
    let outcome = spun(&review, now);
    let review_id = review.id();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(review)));
    reviews.expect_update().return_once(|_, _| Ok(false));
    let mut ledger = MockSpinLedger::new();
    ledger
        .expect_find_by_participant()
        .return_once(move |_| Ok(Some(outcome)));

    let error = service(reviews, ledger, now)
        .submit_feedback(SubmitFeedbackRequest {
            review_id,
            rating: 3,
            comment: None,
        })
        .await
        .expect_err("lost race");

    assert_eq!(error.reason(), Some("feedback_already_submitted"));
}

#[rstest]
#[case(FeedbackStatus::Pending, Some("feedback_missing"))]
#[case(FeedbackStatus::Submitted, None)]
#[case(FeedbackStatus::Verified, Some("already_verified"))]
#[tokio::test]
async fn verify_requires_submitted_feedback(
    now: DateTime<Utc>,
    #[case] status: FeedbackStatus,
    #[case] refusal: Option<&str>,
) {
    let review = stored_review(status, now);
    let review_id = review.id();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(review)));
    reviews
        .expect_update()
        .times(usize::from(refusal.is_none()))
        .returning(|_, _| Ok(true));

    let result = service(reviews, MockSpinLedger::new(), now)
        .verify_review(review_id)
        .await;

    match refusal {
        Some(reason) => assert_eq!(
            result.expect_err("refused").reason(),
            Some(reason)
        ),
        None => assert_eq!(
            result.expect("verified").feedback_status(),
            FeedbackStatus::Verified
        ),
    }
}

#[rstest]
#[tokio::test]
async fn get_review_derives_prize_status(now: DateTime<Utc>) {
    let review = stored_review(FeedbackStatus::Pending, now);
    let outcome = spun(&review, now);
    let review_id = review.id();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(review)));
    let mut ledger = MockSpinLedger::new();
    ledger
        .expect_find_by_participant()
        .return_once(move |_| Ok(Some(outcome)));

    let details = service(reviews, ledger, now)
        .get_review(review_id)
        .await
        .expect("review found");

    assert_eq!(details.prize_status, PrizeStatus::NotEligible);
    assert!(details.outcome.is_some());
}

#[rstest]
#[tokio::test]
async fn list_translates_window_and_page(now: DateTime<Utc>) {
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_list()
        .withf(move |query| {
            query.since == Some(now - Duration::days(7)) && query.limit == 20 && query.offset == 40
        })
        .times(1)
        .return_once(|_| {
            Ok(ReviewPage {
                total: 41,
                items: Vec::new(),
            })
        });

    let listing = service(reviews, MockSpinLedger::new(), now)
        .list_reviews(ListReviewsRequest {
            window: ReviewWindow::LastWeek,
            page: 3,
            limit: 20,
        })
        .await
        .expect("listing succeeds");

    assert_eq!(listing.total, 41);
    assert_eq!(listing.page, 3);
}

#[rstest]
#[case(0, 10, "page")]
#[case(1, 0, "limit")]
#[case(1, 101, "limit")]
#[tokio::test]
async fn list_rejects_bad_paging(
    now: DateTime<Utc>,
    #[case] page: u32,
    #[case] limit: u32,
    #[case] field: &str,
) {
    let mut reviews = MockReviewRepository::new();
    reviews.expect_list().times(0);

    let error = service(reviews, MockSpinLedger::new(), now)
        .list_reviews(ListReviewsRequest {
            window: ReviewWindow::All,
            page,
            limit,
        })
        .await
        .expect_err("bad paging");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|details| details.get("field")),
        Some(&serde_json::json!(field))
    );
}
