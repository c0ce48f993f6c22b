//! Spin API handlers.
//!
//! ```text
//! POST /api/v1/spins {"participantKind":"review","participantId":"…"}
//! GET /api/v1/spins/{id}
//! POST /api/v1/spins/{id}/claim
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{ClaimSpinRequest, SpinRequest, SpinResponse};
use crate::domain::{
    AwardedPrize, ClaimStatus, Error, ParticipantKind, ParticipantRef, SpinId, SpinOutcome,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_label, parse_uuid};

const PARTICIPANT_KINDS: &[&str] = &["review", "customer", "session"];

/// Request body for `POST /api/v1/spins`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinRequestBody {
    /// What originated the spin: `review`, `customer` or `session`.
    #[schema(example = "review")]
    pub participant_kind: String,
    /// Identifier of the participant within its kind.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub participant_id: String,
}

impl TryFrom<SpinRequestBody> for SpinRequest {
    type Error = Error;

    fn try_from(body: SpinRequestBody) -> Result<Self, Self::Error> {
        let kind: ParticipantKind = parse_label(
            &body.participant_kind,
            FieldName::new("participantKind"),
            PARTICIPANT_KINDS,
        )?;
        let id = parse_uuid(&body.participant_id, FieldName::new("participantId"))?;
        Ok(Self {
            participant: ParticipantRef::new(kind, id),
        })
    }
}

/// Prize snapshot carried by a winning outcome.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardedPrizeBody {
    pub reward_id: Uuid,
    pub name: String,
    pub description: String,
    /// Present only once the outcome has been claimed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "FREECOFFEE")]
    pub coupon_code: Option<String>,
    pub requires_review: bool,
}

impl AwardedPrizeBody {
    fn new(prize: &AwardedPrize, status: ClaimStatus) -> Self {
        Self {
            reward_id: *prize.reward_id.as_uuid(),
            name: prize.name.clone(),
            description: prize.description.clone(),
            coupon_code: (status == ClaimStatus::Claimed)
                .then(|| prize.coupon_code.as_str().to_owned()),
            requires_review: prize.requires_review,
        }
    }
}

/// A recorded spin outcome.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinOutcomeBody {
    pub id: Uuid,
    #[schema(example = "review")]
    pub participant_kind: String,
    pub participant_id: Uuid,
    pub prize: Option<AwardedPrizeBody>,
    #[schema(example = "K7M2Q9XD")]
    pub redemption_code: Option<String>,
    /// `pending`, `claimed` or `not_eligible`.
    #[schema(example = "pending")]
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl From<&SpinOutcome> for SpinOutcomeBody {
    fn from(outcome: &SpinOutcome) -> Self {
        let participant = outcome.participant();
        Self {
            id: *outcome.id().as_uuid(),
            participant_kind: participant.kind.as_str().to_owned(),
            participant_id: participant.id,
            prize: outcome
                .prize()
                .map(|prize| AwardedPrizeBody::new(prize, outcome.status())),
            redemption_code: outcome.redemption_code().map(|code| code.as_str().to_owned()),
            status: outcome.status().as_str().to_owned(),
            expires_at: outcome.expires_at(),
            created_at: outcome.created_at(),
            claimed_at: outcome.claimed_at(),
        }
    }
}

/// How a spin ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpinResultKind {
    Won,
    TryAgain,
    NoPrize,
}

/// Response body for `POST /api/v1/spins`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinResultBody {
    pub result: SpinResultKind,
    /// Absent when the pool was exhausted and nothing was recorded.
    pub outcome: Option<SpinOutcomeBody>,
}

impl From<&SpinResponse> for SpinResultBody {
    fn from(response: &SpinResponse) -> Self {
        let result = match response {
            SpinResponse::Won { .. } => SpinResultKind::Won,
            SpinResponse::TryAgain { .. } => SpinResultKind::TryAgain,
            SpinResponse::NoPrize => SpinResultKind::NoPrize,
        };
        Self {
            result,
            outcome: response.outcome().map(SpinOutcomeBody::from),
        }
    }
}

fn spin_id(raw: &str) -> Result<SpinId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(SpinId::from_uuid)
}

/// Spin the wheel for a participant.
///
/// An exhausted pool is not an error: the response carries `no_prize`.
#[utoipa::path(
    post,
    path = "/api/v1/spins",
    request_body = SpinRequestBody,
    responses(
        (status = 200, description = "Spin result", body = SpinResultBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Review not found", body = ErrorSchema),
        (status = 409, description = "Participant has already spun", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["spins"],
    operation_id = "spin"
)]
#[post("/spins")]
pub async fn spin(
    state: web::Data<HttpState>,
    payload: web::Json<SpinRequestBody>,
) -> ApiResult<web::Json<SpinResultBody>> {
    let request = SpinRequest::try_from(payload.into_inner())?;
    let response = state.spins.spin(request).await?;
    Ok(web::Json(SpinResultBody::from(&response)))
}

/// Fetch a recorded spin outcome.
#[utoipa::path(
    get,
    path = "/api/v1/spins/{id}",
    params(("id" = String, Path, description = "Spin identifier")),
    responses(
        (status = 200, description = "Spin outcome", body = SpinOutcomeBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Spin not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["spins"],
    operation_id = "getSpin"
)]
#[get("/spins/{id}")]
pub async fn get_spin(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SpinOutcomeBody>> {
    let id = spin_id(&path.into_inner())?;
    let outcome = state.spins_query.get_spin(id).await?;
    Ok(web::Json(SpinOutcomeBody::from(&outcome)))
}

/// Claim a pending prize.
#[utoipa::path(
    post,
    path = "/api/v1/spins/{id}/claim",
    params(("id" = String, Path, description = "Spin identifier")),
    responses(
        (status = 200, description = "Claimed outcome", body = SpinOutcomeBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Review feedback required", body = ErrorSchema),
        (status = 404, description = "Spin not found", body = ErrorSchema),
        (status = 409, description = "Already claimed, expired or not claimable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["spins"],
    operation_id = "claimSpin"
)]
#[post("/spins/{id}/claim")]
pub async fn claim_spin(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let spin_id = spin_id(&path.into_inner())?;
    let response = state.spins.claim(ClaimSpinRequest { spin_id }).await?;
    Ok(HttpResponse::Ok().json(SpinOutcomeBody::from(&response.outcome)))
}
