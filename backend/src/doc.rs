//! OpenAPI documentation for the REST API.
//!
//! [`ApiDoc`] registers every handler under `/api/v1`, the health probes and
//! the error schema wrappers. Swagger UI serves it at `/docs` in debug
//! builds, and `cargo run --bin openapi-dump` prints it for tooling.

use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Record the trace header contract on the document.
struct TraceHeaderAddon;

impl Modify for TraceHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let description = openapi.info.description.take().unwrap_or_default();
        openapi.info.description = Some(format!(
            "{description} Every response carries a `trace-id` header; send one to reuse it."
        ));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&TraceHeaderAddon),
    info(
        title = "Spin & Win API",
        description = "Spin-the-wheel rewards: reviews, weighted prize draws, claims and analytics.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::spins::spin,
        crate::inbound::http::spins::get_spin,
        crate::inbound::http::spins::claim_spin,
        crate::inbound::http::reviews::submit_review,
        crate::inbound::http::reviews::submit_feedback,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::reviews::verify_review,
        crate::inbound::http::rewards::list_rewards,
        crate::inbound::http::rewards::create_reward,
        crate::inbound::http::rewards::get_reward,
        crate::inbound::http::rewards::update_reward,
        crate::inbound::http::rewards::delete_reward,
        crate::inbound::http::analytics::spins_over_time,
        crate::inbound::http::analytics::review_distribution,
        crate::inbound::http::analytics::reward_tallies,
        crate::inbound::http::analytics::dashboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "spins", description = "Spinning the wheel and claiming prizes"),
        (name = "reviews", description = "Review submission, feedback and moderation"),
        (name = "rewards", description = "Reward pool administration"),
        (name = "analytics", description = "Admin reporting"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
