//! Review flow and moderation handlers.
//!
//! ```text
//! POST /api/v1/reviews {"name":"Grace","email":"grace@example.com"}
//! POST /api/v1/reviews/{id}/feedback {"rating":5,"comment":"Lovely"}
//! GET /api/v1/admin/reviews?window=last_week&page=1&limit=10
//! GET /api/v1/admin/reviews/{id}
//! POST /api/v1/admin/reviews/{id}/verify
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{
    DEFAULT_REVIEW_PAGE_LIMIT, ListReviewsRequest, ReviewDetails, ReviewListing,
    SubmitFeedbackRequest, SubmitReviewRequest,
};
use crate::domain::{Error, Rating, Review, ReviewId, ReviewWindow};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::spins::SpinOutcomeBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_label, parse_uuid};

const REVIEW_WINDOWS: &[&str] = &["all", "today", "last_week", "last_month"];

/// Request body for `POST /api/v1/reviews`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewBody {
    #[schema(example = "Grace Hopper")]
    pub name: String,
    #[schema(example = "grace@example.com")]
    pub email: String,
    pub phone: Option<String>,
}

impl From<SubmitReviewBody> for SubmitReviewRequest {
    fn from(body: SubmitReviewBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
            phone: body.phone,
        }
    }
}

/// Request body for `POST /api/v1/reviews/{id}/feedback`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackBody {
    /// Star rating from 1 to 5.
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: u8,
    pub comment: Option<String>,
}

/// A customer review.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    /// `pending`, `submitted` or `verified`.
    #[schema(example = "pending")]
    pub feedback_status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewBody {
    fn from(review: &Review) -> Self {
        Self {
            id: *review.id().as_uuid(),
            name: review.name().to_owned(),
            email: review.email().as_str().to_owned(),
            phone: review.phone().map(str::to_owned),
            rating: review.rating().map(Rating::value),
            comment: review.comment().map(str::to_owned),
            feedback_status: review.feedback_status().as_str().to_owned(),
            created_at: review.created_at(),
        }
    }
}

/// A review with the prize progress derived from its spin.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetailsBody {
    pub review: ReviewBody,
    /// `pre_spin`, `won_pending`, `won_claimed` or `not_eligible`.
    #[schema(example = "won_pending")]
    pub prize_status: String,
    pub outcome: Option<SpinOutcomeBody>,
}

impl From<&ReviewDetails> for ReviewDetailsBody {
    fn from(details: &ReviewDetails) -> Self {
        Self {
            review: ReviewBody::from(&details.review),
            prize_status: details.prize_status.as_str().to_owned(),
            outcome: details.outcome.as_ref().map(SpinOutcomeBody::from),
        }
    }
}

/// One page of reviews, newest first.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListingBody {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub items: Vec<ReviewBody>,
}

impl From<&ReviewListing> for ReviewListingBody {
    fn from(listing: &ReviewListing) -> Self {
        Self {
            total: listing.total,
            page: listing.page,
            limit: listing.limit,
            items: listing.items.iter().map(ReviewBody::from).collect(),
        }
    }
}

/// Query parameters for `GET /api/v1/admin/reviews`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListReviewsParams {
    /// `all` (default), `today`, `last_week` or `last_month`.
    pub window: Option<String>,
    /// One-based page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

impl TryFrom<ListReviewsParams> for ListReviewsRequest {
    type Error = Error;

    fn try_from(params: ListReviewsParams) -> Result<Self, Self::Error> {
        let window = params
            .window
            .as_deref()
            .map(|raw| parse_label(raw, FieldName::new("window"), REVIEW_WINDOWS))
            .transpose()?
            .unwrap_or(ReviewWindow::All);
        Ok(Self {
            window,
            page: params.page.unwrap_or(1),
            limit: params.limit.unwrap_or(DEFAULT_REVIEW_PAGE_LIMIT),
        })
    }
}

fn review_id(raw: &str) -> Result<ReviewId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(ReviewId::from_uuid)
}

/// Submit a review, the first step before spinning.
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = SubmitReviewBody,
    responses(
        (status = 201, description = "Review created", body = ReviewBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "A review already exists for this email", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "submitReview"
)]
#[post("/reviews")]
pub async fn submit_review(
    state: web::Data<HttpState>,
    payload: web::Json<SubmitReviewBody>,
) -> ApiResult<HttpResponse> {
    let review = state
        .reviews
        .submit_review(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(ReviewBody::from(&review)))
}

/// Leave a rating after spinning.
#[utoipa::path(
    post,
    path = "/api/v1/reviews/{id}/feedback",
    params(("id" = String, Path, description = "Review identifier")),
    request_body = SubmitFeedbackBody,
    responses(
        (status = 200, description = "Feedback recorded", body = ReviewBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Review not found", body = ErrorSchema),
        (status = 409, description = "Not spun yet or feedback already given", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "submitFeedback"
)]
#[post("/reviews/{id}/feedback")]
pub async fn submit_feedback(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SubmitFeedbackBody>,
) -> ApiResult<web::Json<ReviewBody>> {
    let review_id = review_id(&path.into_inner())?;
    let SubmitFeedbackBody { rating, comment } = payload.into_inner();
    let review = state
        .reviews
        .submit_feedback(SubmitFeedbackRequest {
            review_id,
            rating,
            comment,
        })
        .await?;
    Ok(web::Json(ReviewBody::from(&review)))
}

/// List reviews for moderation.
#[utoipa::path(
    get,
    path = "/api/v1/admin/reviews",
    params(ListReviewsParams),
    responses(
        (status = 200, description = "Reviews", body = ReviewListingBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "listReviews"
)]
#[get("/admin/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    query: web::Query<ListReviewsParams>,
) -> ApiResult<web::Json<ReviewListingBody>> {
    let request = ListReviewsRequest::try_from(query.into_inner())?;
    let listing = state.reviews_query.list_reviews(request).await?;
    Ok(web::Json(ReviewListingBody::from(&listing)))
}

/// Fetch a review with its prize status.
#[utoipa::path(
    get,
    path = "/api/v1/admin/reviews/{id}",
    params(("id" = String, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "Review", body = ReviewDetailsBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Review not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "getReview"
)]
#[get("/admin/reviews/{id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReviewDetailsBody>> {
    let id = review_id(&path.into_inner())?;
    let details = state.reviews_query.get_review(id).await?;
    Ok(web::Json(ReviewDetailsBody::from(&details)))
}

/// Mark submitted feedback as verified.
#[utoipa::path(
    post,
    path = "/api/v1/admin/reviews/{id}/verify",
    params(("id" = String, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "Review verified", body = ReviewBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Review not found", body = ErrorSchema),
        (status = 409, description = "Review is not awaiting verification", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "verifyReview"
)]
#[post("/admin/reviews/{id}/verify")]
pub async fn verify_review(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReviewBody>> {
    let id = review_id(&path.into_inner())?;
    let review = state.reviews.verify_review(id).await?;
    Ok(web::Json(ReviewBody::from(&review)))
}
