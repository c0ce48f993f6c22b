//! Port for review persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{FeedbackStatus, Rating, Review, ReviewId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "review repository query failed: {message}",
        /// A review with the same email already exists.
        DuplicateEmail { email: String } =>
            "a review for {email} already exists",
    }
}

/// Window and page selection for [`ReviewRepository::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewListQuery {
    /// Earliest `created_at` to include.
    pub since: Option<DateTime<Utc>>,
    pub limit: u32,
    pub offset: u64,
}

/// One page of reviews plus the size of the whole window.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPage {
    pub total: u64,
    pub items: Vec<Review>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Store a new review; the email must be unused.
    async fn insert(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Replace a stored review, but only while its feedback status is still
    /// `expected_status`. Returns `false` when the review is missing or has
    /// moved on.
    async fn update(
        &self,
        review: &Review,
        expected_status: FeedbackStatus,
    ) -> Result<bool, ReviewRepositoryError>;

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Reviews in the window, newest first.
    async fn list(&self, query: &ReviewListQuery) -> Result<ReviewPage, ReviewRepositoryError>;

    /// Ratings of every review that has one.
    async fn list_ratings(&self) -> Result<Vec<Rating>, ReviewRepositoryError>;
}
