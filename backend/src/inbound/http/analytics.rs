//! Admin analytics handlers.
//!
//! ```text
//! GET /api/v1/admin/analytics/spins?period=weekly
//! GET /api/v1/admin/analytics/reviews
//! GET /api/v1/admin/analytics/rewards
//! GET /api/v1/admin/analytics/dashboard
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    AnalyticsPeriod, Dashboard, Error, ReviewDistribution, RewardTally, SpinBucket,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_label};

const PERIODS: &[&str] = &["daily", "weekly", "monthly"];

/// Spin count for one time bucket.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinBucketBody {
    /// `2026-10-18`, `2026-W42` or `2026-10` depending on the period.
    #[schema(example = "2026-10-18")]
    pub label: String,
    pub count: u64,
}

impl From<&SpinBucket> for SpinBucketBody {
    fn from(bucket: &SpinBucket) -> Self {
        Self {
            label: bucket.label.clone(),
            count: bucket.count,
        }
    }
}

/// Positive versus negative split over rated reviews.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDistributionBody {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    #[schema(example = 66.67)]
    pub positive_percentage: f64,
    #[schema(example = 33.33)]
    pub negative_percentage: f64,
}

impl From<&ReviewDistribution> for ReviewDistributionBody {
    fn from(distribution: &ReviewDistribution) -> Self {
        Self {
            total: distribution.total,
            positive: distribution.positive,
            negative: distribution.negative,
            positive_percentage: distribution.positive_percentage,
            negative_percentage: distribution.negative_percentage,
        }
    }
}

/// Awarded and claimed counts for one reward.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardTallyBody {
    pub reward_id: Uuid,
    pub name: String,
    pub awarded: u64,
    pub claimed: u64,
}

impl From<&RewardTally> for RewardTallyBody {
    fn from(tally: &RewardTally) -> Self {
        Self {
            reward_id: *tally.reward_id.as_uuid(),
            name: tally.name.clone(),
            awarded: tally.awarded,
            claimed: tally.claimed,
        }
    }
}

/// Daily spins, review split and top rewards in one payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBody {
    pub spins: Vec<SpinBucketBody>,
    pub reviews: ReviewDistributionBody,
    pub rewards: Vec<RewardTallyBody>,
}

impl From<&Dashboard> for DashboardBody {
    fn from(summary: &Dashboard) -> Self {
        Self {
            spins: summary.spins.iter().map(SpinBucketBody::from).collect(),
            reviews: ReviewDistributionBody::from(&summary.reviews),
            rewards: summary.rewards.iter().map(RewardTallyBody::from).collect(),
        }
    }
}

/// Query parameters for `GET /api/v1/admin/analytics/spins`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SpinsOverTimeParams {
    /// `daily` (default), `weekly` or `monthly`.
    pub period: Option<String>,
}

fn period(params: &SpinsOverTimeParams) -> Result<AnalyticsPeriod, Error> {
    params
        .period
        .as_deref()
        .map(|raw| parse_label(raw, FieldName::new("period"), PERIODS))
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Spin counts bucketed over a period.
#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics/spins",
    params(SpinsOverTimeParams),
    responses(
        (status = 200, description = "Spin buckets in ascending order", body = [SpinBucketBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["analytics"],
    operation_id = "spinsOverTime"
)]
#[get("/admin/analytics/spins")]
pub async fn spins_over_time(
    state: web::Data<HttpState>,
    query: web::Query<SpinsOverTimeParams>,
) -> ApiResult<web::Json<Vec<SpinBucketBody>>> {
    let period = period(&query)?;
    let buckets = state.analytics.spins_over_time(period).await?;
    Ok(web::Json(buckets.iter().map(SpinBucketBody::from).collect()))
}

/// Review rating distribution.
#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics/reviews",
    responses(
        (status = 200, description = "Distribution", body = ReviewDistributionBody),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["analytics"],
    operation_id = "reviewDistribution"
)]
#[get("/admin/analytics/reviews")]
pub async fn review_distribution(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<ReviewDistributionBody>> {
    let distribution = state.analytics.review_distribution().await?;
    Ok(web::Json(ReviewDistributionBody::from(&distribution)))
}

/// Most-awarded rewards with claim counts.
#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics/rewards",
    responses(
        (status = 200, description = "Reward tallies", body = [RewardTallyBody]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["analytics"],
    operation_id = "rewardTallies"
)]
#[get("/admin/analytics/rewards")]
pub async fn reward_tallies(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<RewardTallyBody>>> {
    let tallies = state.analytics.reward_tallies().await?;
    Ok(web::Json(tallies.iter().map(RewardTallyBody::from).collect()))
}

/// Combined dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardBody),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["analytics"],
    operation_id = "dashboard"
)]
#[get("/admin/analytics/dashboard")]
pub async fn dashboard(state: web::Data<HttpState>) -> ApiResult<web::Json<DashboardBody>> {
    let summary = state.analytics.dashboard().await?;
    Ok(web::Json(DashboardBody::from(&summary)))
}
