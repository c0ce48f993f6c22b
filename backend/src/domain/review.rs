//! Customer reviews and the three-step review flow.
//!
//! A review is created with contact details before the spin, then receives a
//! rating and comment after it, and is finally verified by an administrator.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ClaimStatus, ParseLabelError, SpinOutcome};

/// Maximum reviewer name length in characters.
pub const REVIEWER_NAME_MAX: usize = 120;
/// Maximum comment length in characters.
pub const REVIEW_COMMENT_MAX: usize = 2000;

/// Validation errors raised while building reviews.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
    #[error("comment must be at most {max} characters")]
    CommentTooLong { max: usize },
    #[error("comment must not be empty")]
    EmptyComment,
}

impl ReviewValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::InvalidEmail => "email",
            Self::RatingOutOfRange => "rating",
            Self::CommentTooLong { .. } | Self::EmptyComment => "comment",
        }
    }
}

/// Refused review state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReviewTransitionError {
    #[error("feedback has already been submitted for this review")]
    FeedbackAlreadySubmitted,
    #[error("the review has no feedback to verify")]
    FeedbackMissing,
    #[error("the review is already verified")]
    AlreadyVerified,
}

impl ReviewTransitionError {
    pub fn code(self) -> &'static str {
        match self {
            Self::FeedbackAlreadySubmitted => "feedback_already_submitted",
            Self::FeedbackMissing => "feedback_missing",
            Self::AlreadyVerified => "already_verified",
        }
    }
}

/// Stable review identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(Uuid);

impl ReviewId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Normalised (trimmed, lower-case) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate an address.
    ///
    /// # Examples
    /// ```
    /// use spinwin::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_str(), "ada@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ReviewValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        let valid = match normalised.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !normalised.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(ReviewValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ReviewValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self, ReviewValidationError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ReviewValidationError::RatingOutOfRange)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Four and five stars count as positive.
    pub fn is_positive(self) -> bool {
        self.0 >= 4
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ReviewValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-text comment left with a rating.
///
/// ## Invariants
/// - Trimmed, non-empty, at most [`REVIEW_COMMENT_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewComment(String);

impl ReviewComment {
    /// Normalise a comment; blank input yields `Ok(None)`.
    pub fn parse(raw: impl AsRef<str>) -> Result<Option<Self>, ReviewValidationError> {
        let text = raw.as_ref().trim();
        if text.is_empty() {
            return Ok(None);
        }
        if text.chars().count() > REVIEW_COMMENT_MAX {
            return Err(ReviewValidationError::CommentTooLong {
                max: REVIEW_COMMENT_MAX,
            });
        }
        Ok(Some(Self(text.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ReviewComment> for String {
    fn from(value: ReviewComment) -> Self {
        value.0
    }
}

impl TryFrom<String> for ReviewComment {
    type Error = ReviewValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)?.ok_or(ReviewValidationError::EmptyComment)
    }
}

/// Progress of the post-spin feedback step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Pending,
    Submitted,
    Verified,
}

impl FeedbackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Verified => "verified",
        }
    }
}

impl FromStr for FeedbackStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            "verified" => Ok(Self::Verified),
            other => Err(ParseLabelError::new("feedback status", other)),
        }
    }
}

/// Prize progress of a review participant, derived from its spin outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeStatus {
    PreSpin,
    WonPending,
    WonClaimed,
    NotEligible,
}

impl PrizeStatus {
    pub fn from_outcome(outcome: Option<&SpinOutcome>) -> Self {
        match outcome.map(SpinOutcome::status) {
            None => Self::PreSpin,
            Some(ClaimStatus::Pending) => Self::WonPending,
            Some(ClaimStatus::Claimed) => Self::WonClaimed,
            Some(ClaimStatus::NotEligible) => Self::NotEligible,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreSpin => "pre_spin",
            Self::WonPending => "won_pending",
            Self::WonClaimed => "won_claimed",
            Self::NotEligible => "not_eligible",
        }
    }
}

/// Time window used when listing reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewWindow {
    #[default]
    All,
    Today,
    LastWeek,
    LastMonth,
}

impl ReviewWindow {
    /// Earliest creation time included by the window.
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Today => Utc
                .from_local_datetime(&now.date_naive().and_time(chrono::NaiveTime::MIN))
                .single(),
            Self::LastWeek => Some(now - chrono::Duration::days(7)),
            Self::LastMonth => now.checked_sub_months(Months::new(1)),
        }
    }
}

impl FromStr for ReviewWindow {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "last_week" => Ok(Self::LastWeek),
            "last_month" => Ok(Self::LastMonth),
            other => Err(ParseLabelError::new("review window", other)),
        }
    }
}

/// Input for [`Review::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub id: ReviewId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub feedback_status: FeedbackStatus,
    pub created_at: DateTime<Utc>,
}

/// A customer review.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    id: ReviewId,
    name: String,
    email: EmailAddress,
    phone: Option<String>,
    rating: Option<Rating>,
    comment: Option<ReviewComment>,
    feedback_status: FeedbackStatus,
    created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(draft: ReviewDraft) -> Result<Self, ReviewValidationError> {
        let ReviewDraft {
            id,
            name,
            email,
            phone,
            rating,
            comment,
            feedback_status,
            created_at,
        } = draft;

        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(ReviewValidationError::EmptyName);
        }
        if name.chars().count() > REVIEWER_NAME_MAX {
            return Err(ReviewValidationError::NameTooLong {
                max: REVIEWER_NAME_MAX,
            });
        }

        Ok(Self {
            id,
            name,
            email: EmailAddress::new(email)?,
            phone: phone
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            rating: rating.map(Rating::new).transpose()?,
            comment: comment.map(ReviewComment::parse).transpose()?.flatten(),
            feedback_status,
            created_at,
        })
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_ref().map(ReviewComment::as_str)
    }

    pub fn feedback_status(&self) -> FeedbackStatus {
        self.feedback_status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the post-spin feedback step is done.
    pub fn has_feedback(&self) -> bool {
        matches!(
            self.feedback_status,
            FeedbackStatus::Submitted | FeedbackStatus::Verified
        )
    }

    /// Record the rating and comment, once.
    pub fn with_feedback(
        &self,
        rating: Rating,
        comment: Option<ReviewComment>,
    ) -> Result<Self, ReviewTransitionError> {
        if self.feedback_status != FeedbackStatus::Pending {
            return Err(ReviewTransitionError::FeedbackAlreadySubmitted);
        }
        Ok(Self {
            rating: Some(rating),
            comment,
            feedback_status: FeedbackStatus::Submitted,
            ..self.clone()
        })
    }

    /// Mark submitted feedback as verified.
    pub fn verified(&self) -> Result<Self, ReviewTransitionError> {
        match self.feedback_status {
            FeedbackStatus::Pending => Err(ReviewTransitionError::FeedbackMissing),
            FeedbackStatus::Verified => Err(ReviewTransitionError::AlreadyVerified),
            FeedbackStatus::Submitted => Ok(Self {
                feedback_status: FeedbackStatus::Verified,
                ..self.clone()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn draft() -> ReviewDraft {
        ReviewDraft {
            id: ReviewId::random(),
            name: " Grace ".to_owned(),
            email: "Grace@Example.com".to_owned(),
            phone: Some("  ".to_owned()),
            rating: None,
            comment: None,
            feedback_status: FeedbackStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn new_normalises_fields(draft: ReviewDraft) {
        let review = Review::new(draft).expect("valid review");
        assert_eq!(review.name(), "Grace");
        assert_eq!(review.email().as_str(), "grace@example.com");
        assert!(review.phone().is_none());
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("@example.com")]
    #[case("a@")]
    #[case("a b@example.com")]
    fn email_rejects_malformed_values(#[case] raw: &str) {
        assert_eq!(EmailAddress::new(raw), Err(ReviewValidationError::InvalidEmail));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn rating_accepts_one_to_five(#[case] raw: u8, #[case] valid: bool) {
        assert_eq!(Rating::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn feedback_flow_moves_forward_only(draft: ReviewDraft) {
        let review = Review::new(draft).expect("valid review");
        assert_eq!(review.verified(), Err(ReviewTransitionError::FeedbackMissing));

        let rating = Rating::new(5).expect("valid rating");
        let comment = ReviewComment::parse(" Lovely ").expect("valid comment");
        let submitted = review
            .with_feedback(rating, comment)
            .expect("first feedback accepted");
        assert_eq!(submitted.feedback_status(), FeedbackStatus::Submitted);
        assert_eq!(submitted.comment(), Some("Lovely"));
        assert_eq!(
            submitted.with_feedback(rating, None),
            Err(ReviewTransitionError::FeedbackAlreadySubmitted)
        );

        let verified = submitted.verified().expect("verification accepted");
        assert!(verified.has_feedback());
        assert_eq!(verified.verified(), Err(ReviewTransitionError::AlreadyVerified));
    }

    #[rstest]
    fn window_since_bounds() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 31, 15, 30, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(ReviewWindow::All.since(now), None);
        assert_eq!(
            ReviewWindow::Today.since(now),
            Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).single()
        );
        assert_eq!(ReviewWindow::LastWeek.since(now), Some(now - Duration::days(7)));
        assert_eq!(
            ReviewWindow::LastMonth.since(now),
            Utc.with_ymd_and_hms(2026, 2, 28, 15, 30, 0).single()
        );
    }

    #[rstest]
    fn prize_status_defaults_to_pre_spin() {
        assert_eq!(PrizeStatus::from_outcome(None), PrizeStatus::PreSpin);
    }
}
