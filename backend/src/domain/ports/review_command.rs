//! Driving port for the review flow.
//!
//! Step one stores contact details before the spin, step two is the spin
//! itself (see [`super::SpinCommand`]), step three adds rating and comment.
//! Administrators then verify submitted feedback.

use async_trait::async_trait;

use crate::domain::{Error, Review, ReviewId};

/// Pre-spin review details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReviewRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Post-spin feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFeedbackRequest {
    pub review_id: ReviewId,
    pub rating: u8,
    pub comment: Option<String>,
}

/// Driving port for review write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// Store a new review. A second review for the same email is a
    /// `conflict` with reason `already_submitted`.
    async fn submit_review(&self, request: SubmitReviewRequest) -> Result<Review, Error>;

    /// Attach rating and comment once the review has spun.
    async fn submit_feedback(&self, request: SubmitFeedbackRequest) -> Result<Review, Error>;

    /// Mark submitted feedback as verified.
    async fn verify_review(&self, id: ReviewId) -> Result<Review, Error>;
}
