//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

use actix_web::web;

use crate::domain::Error;

pub mod analytics;
pub mod error;
pub mod health;
pub mod reviews;
pub mod rewards;
pub mod schemas;
pub mod spins;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod validation;

pub use error::ApiResult;

fn malformed(kind: &str, err: impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(format!("malformed {kind}: {err}"))
        .with_reason("malformed_request")
        .into()
}

/// Register every API route and the extractor error handlers.
///
/// ```
/// use actix_web::{App, web};
/// use spinwin::inbound::http::configure;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| malformed("JSON body", err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| malformed("query", err)))
        .service(spins::spin)
        .service(spins::get_spin)
        .service(spins::claim_spin)
        .service(reviews::submit_review)
        .service(reviews::submit_feedback)
        .service(reviews::list_reviews)
        .service(reviews::get_review)
        .service(reviews::verify_review)
        .service(rewards::list_rewards)
        .service(rewards::create_reward)
        .service(rewards::get_reward)
        .service(rewards::update_reward)
        .service(rewards::delete_reward)
        .service(analytics::spins_over_time)
        .service(analytics::review_distribution)
        .service(analytics::reward_tallies)
        .service(analytics::dashboard);
}
