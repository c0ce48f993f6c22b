//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services that implement the driving ports.
//! Types are immutable once validated; transitions return new values.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - RewardDefinition — a prize or the try-again slice of the wheel.
//! - SpinOutcome — the recorded result of one spin.
//! - Review — a customer review moving through the feedback flow.
//! - select / pick_index — weighted reward selection.

pub mod allocator;
pub mod analytics;
pub mod analytics_service;
pub mod error;
pub mod ports;
pub mod redemption_code;
pub mod review;
pub mod review_service;
pub mod reward;
pub mod reward_service;
pub mod spin;
pub mod spin_service;
pub mod trace_id;

pub use self::allocator::{
    AllocationError, RewardDraw, SeededDraw, ThreadRngDraw, pick_index, select,
};
pub use self::analytics::{
    AnalyticsPeriod, Dashboard, ReviewDistribution, RewardTally, SpinBucket, TOP_REWARDS,
    review_distribution, reward_tallies, spins_over_time,
};
pub use self::analytics_service::AnalyticsService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::redemption_code::{
    REDEMPTION_CODE_LENGTH, RandomCodeGenerator, RedemptionCode, RedemptionCodeError,
    RedemptionCodeGenerator,
};
pub use self::review::{
    EmailAddress, FeedbackStatus, PrizeStatus, REVIEW_COMMENT_MAX, REVIEWER_NAME_MAX, Rating,
    Review, ReviewComment, ReviewDraft, ReviewId, ReviewTransitionError, ReviewValidationError,
    ReviewWindow,
};
pub use self::review_service::ReviewService;
pub use self::reward::{
    COUPON_CODE_MAX, CouponCode, EXPIRY_DAYS_MAX, REWARD_DESCRIPTION_MAX, REWARD_NAME_MAX,
    RewardDefinition, RewardDraft, RewardId, RewardKind, RewardValidationError, STOCK_MAX,
    SliceWeight,
};
pub use self::reward_service::RewardService;
pub use self::spin::{
    AwardedPrize, ClaimError, ClaimStatus, ParseLabelError, ParticipantKind, ParticipantRef,
    SpinId, SpinOutcome, SpinOutcomeDraft, SpinOutcomeError,
};
pub use self::spin_service::{SpinPolicy, SpinService, SpinServicePorts, SpinServiceRuntime};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use spinwin::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
