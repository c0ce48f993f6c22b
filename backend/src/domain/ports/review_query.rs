//! Driving port for reading reviews.

use async_trait::async_trait;

use crate::domain::{Error, PrizeStatus, Review, ReviewId, ReviewWindow, SpinOutcome};

/// Default page size for review listings.
pub const DEFAULT_REVIEW_PAGE_LIMIT: u32 = 10;
/// Largest accepted page size for review listings.
pub const MAX_REVIEW_PAGE_LIMIT: u32 = 100;

/// A review together with the state of its spin.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDetails {
    pub review: Review,
    pub prize_status: PrizeStatus,
    pub outcome: Option<SpinOutcome>,
}

/// Listing parameters; `page` is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListReviewsRequest {
    pub window: ReviewWindow,
    pub page: u32,
    pub limit: u32,
}

impl Default for ListReviewsRequest {
    fn default() -> Self {
        Self {
            window: ReviewWindow::All,
            page: 1,
            limit: DEFAULT_REVIEW_PAGE_LIMIT,
        }
    }
}

/// One page of reviews.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewListing {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub items: Vec<Review>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewQuery: Send + Sync {
    async fn get_review(&self, id: ReviewId) -> Result<ReviewDetails, Error>;

    /// Reviews in the window, newest first. `page` must be at least one and
    /// `limit` between one and [`MAX_REVIEW_PAGE_LIMIT`].
    async fn list_reviews(&self, request: ListReviewsRequest) -> Result<ReviewListing, Error>;
}
