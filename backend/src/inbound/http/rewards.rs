//! Reward administration handlers.
//!
//! ```text
//! GET /api/v1/admin/rewards
//! POST /api/v1/admin/rewards {"name":"Free coffee","kind":"prize","couponCode":"COFFEE","stock":10}
//! GET|PUT|DELETE /api/v1/admin/rewards/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::RewardInput;
use crate::domain::{
    CouponCode, Error, RewardDefinition, RewardId, RewardKind, RewardValidationError, SliceWeight,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request body for creating or replacing a reward.
///
/// `kind` is `prize` (requires `couponCode` and `stock`) or `try_again`
/// (requires `weight`).
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardRequestBody {
    #[schema(example = "Free coffee")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(example = "prize")]
    pub kind: String,
    #[schema(example = "COFFEE")]
    pub coupon_code: Option<String>,
    #[schema(example = 10)]
    pub stock: Option<u32>,
    pub weight: Option<f64>,
    pub expiry_days: Option<u32>,
    #[serde(default)]
    pub requires_review: bool,
}

fn invalid_reward(error: RewardValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_reward",
    }))
}

fn missing_field(field: &str, kind: &str) -> Error {
    Error::invalid_request(format!("{field} is required for {kind} rewards")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

impl TryFrom<RewardRequestBody> for RewardInput {
    type Error = Error;

    fn try_from(body: RewardRequestBody) -> Result<Self, Self::Error> {
        let kind = match body.kind.as_str() {
            "prize" => {
                let coupon_code = body
                    .coupon_code
                    .ok_or_else(|| missing_field("couponCode", "prize"))?;
                let stock = body.stock.ok_or_else(|| missing_field("stock", "prize"))?;
                RewardKind::Prize {
                    coupon_code: CouponCode::new(coupon_code).map_err(invalid_reward)?,
                    stock,
                }
            }
            "try_again" => {
                let weight = body
                    .weight
                    .ok_or_else(|| missing_field("weight", "try_again"))?;
                RewardKind::TryAgain {
                    weight: SliceWeight::new(weight).map_err(invalid_reward)?,
                }
            }
            other => {
                return Err(
                    Error::invalid_request("kind must be one of: prize, try_again").with_details(
                        json!({"field": "kind", "value": other, "code": "invalid_value"}),
                    ),
                );
            }
        };
        Ok(Self {
            name: body.name,
            description: body.description,
            kind,
            expiry_days: body.expiry_days,
            requires_review: body.requires_review,
        })
    }
}

/// A reward as shown to administrators.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardBody {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(example = "prize")]
    pub kind: String,
    pub coupon_code: Option<String>,
    pub stock: Option<u32>,
    /// Effective draw weight: stock for prizes, the explicit weight otherwise.
    pub weight: f64,
    pub expiry_days: Option<u32>,
    pub requires_review: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&RewardDefinition> for RewardBody {
    fn from(reward: &RewardDefinition) -> Self {
        let kind = match reward.kind() {
            RewardKind::Prize { .. } => "prize",
            RewardKind::TryAgain { .. } => "try_again",
        };
        Self {
            id: *reward.id().as_uuid(),
            name: reward.name().to_owned(),
            description: reward.description().to_owned(),
            kind: kind.to_owned(),
            coupon_code: reward.coupon_code().map(|code| code.as_str().to_owned()),
            stock: reward.stock(),
            weight: reward.weight(),
            expiry_days: reward.expiry_days(),
            requires_review: reward.requires_review(),
            created_at: reward.created_at(),
        }
    }
}

fn reward_id(raw: &str) -> Result<RewardId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(RewardId::from_uuid)
}

/// List every reward in draw order.
#[utoipa::path(
    get,
    path = "/api/v1/admin/rewards",
    responses(
        (status = 200, description = "Rewards", body = [RewardBody]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "listRewards"
)]
#[get("/admin/rewards")]
pub async fn list_rewards(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<RewardBody>>> {
    let rewards = state.rewards_query.list_rewards().await?;
    Ok(web::Json(rewards.iter().map(RewardBody::from).collect()))
}

/// Create a reward.
#[utoipa::path(
    post,
    path = "/api/v1/admin/rewards",
    request_body = RewardRequestBody,
    responses(
        (status = 201, description = "Reward created", body = RewardBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Coupon code already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "createReward"
)]
#[post("/admin/rewards")]
pub async fn create_reward(
    state: web::Data<HttpState>,
    payload: web::Json<RewardRequestBody>,
) -> ApiResult<HttpResponse> {
    let input = RewardInput::try_from(payload.into_inner())?;
    let reward = state.rewards.create_reward(input).await?;
    Ok(HttpResponse::Created().json(RewardBody::from(&reward)))
}

/// Fetch one reward.
#[utoipa::path(
    get,
    path = "/api/v1/admin/rewards/{id}",
    params(("id" = String, Path, description = "Reward identifier")),
    responses(
        (status = 200, description = "Reward", body = RewardBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Reward not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "getReward"
)]
#[get("/admin/rewards/{id}")]
pub async fn get_reward(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RewardBody>> {
    let id = reward_id(&path.into_inner())?;
    let reward = state.rewards_query.get_reward(id).await?;
    Ok(web::Json(RewardBody::from(&reward)))
}

/// Replace a reward's definition, including its remaining stock.
#[utoipa::path(
    put,
    path = "/api/v1/admin/rewards/{id}",
    params(("id" = String, Path, description = "Reward identifier")),
    request_body = RewardRequestBody,
    responses(
        (status = 200, description = "Reward updated", body = RewardBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Reward not found", body = ErrorSchema),
        (status = 409, description = "Coupon code already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "updateReward"
)]
#[put("/admin/rewards/{id}")]
pub async fn update_reward(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RewardRequestBody>,
) -> ApiResult<web::Json<RewardBody>> {
    let id = reward_id(&path.into_inner())?;
    let input = RewardInput::try_from(payload.into_inner())?;
    let reward = state.rewards.update_reward(id, input).await?;
    Ok(web::Json(RewardBody::from(&reward)))
}

/// Delete a reward. Recorded outcomes keep their prize snapshot.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/rewards/{id}",
    params(("id" = String, Path, description = "Reward identifier")),
    responses(
        (status = 204, description = "Reward deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Reward not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "deleteReward"
)]
#[delete("/admin/rewards/{id}")]
pub async fn delete_reward(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = reward_id(&path.into_inner())?;
    state.rewards.delete_reward(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
