//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`RewardRepository`, `SpinLedger`, `ReviewRepository`) are
//! implemented by the outbound adapters. Driving ports are implemented by
//! the domain services and called by the HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod analytics_query;
mod review_command;
mod review_query;
mod review_repository;
mod reward_admin_command;
mod reward_admin_query;
mod reward_repository;
mod spin_command;
mod spin_ledger;
mod spin_query;

pub use analytics_query::AnalyticsQuery;
#[cfg(test)]
pub use analytics_query::MockAnalyticsQuery;
#[cfg(test)]
pub use review_command::MockReviewCommand;
pub use review_command::{ReviewCommand, SubmitFeedbackRequest, SubmitReviewRequest};
#[cfg(test)]
pub use review_query::MockReviewQuery;
pub use review_query::{
    DEFAULT_REVIEW_PAGE_LIMIT, ListReviewsRequest, MAX_REVIEW_PAGE_LIMIT, ReviewDetails,
    ReviewListing, ReviewQuery,
};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{
    ReviewListQuery, ReviewPage, ReviewRepository, ReviewRepositoryError,
};
#[cfg(test)]
pub use reward_admin_command::MockRewardAdminCommand;
pub use reward_admin_command::{RewardAdminCommand, RewardInput};
#[cfg(test)]
pub use reward_admin_query::MockRewardAdminQuery;
pub use reward_admin_query::RewardAdminQuery;
#[cfg(test)]
pub use reward_repository::MockRewardRepository;
pub use reward_repository::{RewardRepository, RewardRepositoryError};
#[cfg(test)]
pub use spin_command::MockSpinCommand;
pub use spin_command::{ClaimSpinRequest, ClaimSpinResponse, SpinCommand, SpinRequest, SpinResponse};
#[cfg(test)]
pub use spin_ledger::MockSpinLedger;
pub use spin_ledger::{RecordOutcome, SpinLedger, SpinLedgerError};
#[cfg(test)]
pub use spin_query::MockSpinQuery;
pub use spin_query::SpinQuery;
