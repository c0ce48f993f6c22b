//! Review flow and moderation service.
//!
//! Reviews are created before the spin, get their rating once the reviewer
//! has spun, and are then verified by an administrator. Each transition is
//! written with a compare-on-status update so two concurrent submissions
//! cannot both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    ListReviewsRequest, MAX_REVIEW_PAGE_LIMIT, ReviewCommand, ReviewDetails, ReviewListQuery,
    ReviewListing, ReviewQuery, ReviewRepository, SpinLedger, SubmitFeedbackRequest,
    SubmitReviewRequest,
};
use crate::domain::spin_service::{map_ledger_error, map_review_repository_error};
use crate::domain::{
    Error, FeedbackStatus, ParticipantKind, ParticipantRef, PrizeStatus, Rating, Review,
    ReviewComment, ReviewDraft, ReviewId, ReviewTransitionError, ReviewValidationError,
    SpinOutcome,
};

fn invalid_review(error: ReviewValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_review",
    }))
}

fn transition_refused(error: ReviewTransitionError) -> Error {
    Error::conflict(error.to_string()).with_reason(error.code())
}

fn review_not_found(id: ReviewId) -> Error {
    Error::not_found(format!("review {id} not found"))
}

fn invalid_page(field: &str, message: &str) -> Error {
    Error::invalid_request(message.to_owned()).with_details(json!({
        "field": field,
        "code": "out_of_range",
    }))
}

/// Review service implementing [`ReviewCommand`] and [`ReviewQuery`].
pub struct ReviewService<R: ?Sized, L: ?Sized> {
    reviews: Arc<R>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized, L: ?Sized> ReviewService<R, L> {
    pub fn new(reviews: Arc<R>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reviews,
            ledger,
            clock,
        }
    }
}

impl<R, L> ReviewService<R, L>
where
    R: ReviewRepository + ?Sized,
    L: SpinLedger + ?Sized,
{
    async fn load(&self, id: ReviewId) -> Result<Review, Error> {
        self.reviews
            .find_by_id(&id)
            .await
            .map_err(map_review_repository_error)?
            .ok_or_else(|| review_not_found(id))
    }

    async fn outcome_for(&self, id: ReviewId) -> Result<Option<SpinOutcome>, Error> {
        let participant = ParticipantRef::new(ParticipantKind::Review, *id.as_uuid());
        self.ledger
            .find_by_participant(&participant)
            .await
            .map_err(map_ledger_error)
    }

    /// Persist `next` if the stored review is still at `expected`.
    async fn transition(
        &self,
        next: &Review,
        expected: FeedbackStatus,
        lost: ReviewTransitionError,
    ) -> Result<(), Error> {
        let written = self
            .reviews
            .update(next, expected)
            .await
            .map_err(map_review_repository_error)?;
        if written {
            Ok(())
        } else {
            Err(transition_refused(lost))
        }
    }
}

#[async_trait]
impl<R, L> ReviewCommand for ReviewService<R, L>
where
    R: ReviewRepository + ?Sized,
    L: SpinLedger + ?Sized,
{
    async fn submit_review(&self, request: SubmitReviewRequest) -> Result<Review, Error> {
        let review = Review::new(ReviewDraft {
            id: ReviewId::random(),
            name: request.name,
            email: request.email,
            phone: request.phone,
            rating: None,
            comment: None,
            feedback_status: FeedbackStatus::Pending,
            created_at: self.clock.utc(),
        })
        .map_err(invalid_review)?;

        self.reviews
            .insert(&review)
            .await
            .map_err(map_review_repository_error)?;
        info!(review_id = %review.id(), "review submitted");
        Ok(review)
    }

    async fn submit_feedback(&self, request: SubmitFeedbackRequest) -> Result<Review, Error> {
        let rating = Rating::new(request.rating).map_err(invalid_review)?;
        let comment = request
            .comment
            .map(ReviewComment::parse)
            .transpose()
            .map_err(invalid_review)?
            .flatten();

        let review = self.load(request.review_id).await?;
        if self.outcome_for(review.id()).await?.is_none() {
            return Err(
                Error::conflict("feedback can only be left after spinning the wheel")
                    .with_reason("spin_required"),
            );
        }

        let next = review
            .with_feedback(rating, comment)
            .map_err(transition_refused)?;
        self.transition(
            &next,
            FeedbackStatus::Pending,
            ReviewTransitionError::FeedbackAlreadySubmitted,
        )
        .await?;
        info!(review_id = %next.id(), rating = rating.value(), "review feedback submitted");
        Ok(next)
    }

    async fn verify_review(&self, id: ReviewId) -> Result<Review, Error> {
        let review = self.load(id).await?;
        let next = review.verified().map_err(transition_refused)?;
        self.transition(
            &next,
            FeedbackStatus::Submitted,
            ReviewTransitionError::AlreadyVerified,
        )
        .await?;
        info!(review_id = %id, "review verified");
        Ok(next)
    }
}

#[async_trait]
impl<R, L> ReviewQuery for ReviewService<R, L>
where
    R: ReviewRepository + ?Sized,
    L: SpinLedger + ?Sized,
{
    async fn get_review(&self, id: ReviewId) -> Result<ReviewDetails, Error> {
        let review = self.load(id).await?;
        let outcome = self.outcome_for(id).await?;
        Ok(ReviewDetails {
            prize_status: PrizeStatus::from_outcome(outcome.as_ref()),
            review,
            outcome,
        })
    }

    async fn list_reviews(&self, request: ListReviewsRequest) -> Result<ReviewListing, Error> {
        if request.page == 0 {
            return Err(invalid_page("page", "page must be at least 1"));
        }
        if request.limit == 0 || request.limit > MAX_REVIEW_PAGE_LIMIT {
            return Err(invalid_page(
                "limit",
                &format!("limit must be between 1 and {MAX_REVIEW_PAGE_LIMIT}"),
            ));
        }

        let query = ReviewListQuery {
            since: request.window.since(self.clock.utc()),
            limit: request.limit,
            offset: u64::from(request.page - 1) * u64::from(request.limit),
        };
        let page = self
            .reviews
            .list(&query)
            .await
            .map_err(map_review_repository_error)?;
        Ok(ReviewListing {
            total: page.total,
            page: request.page,
            limit: request.limit,
            items: page.items,
        })
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
