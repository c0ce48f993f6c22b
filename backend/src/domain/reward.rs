//! Reward inventory model.
//!
//! A reward is either a prize backed by a coupon and a finite stock, or the
//! non-winning "try again" slice. Both share one weighted draw: a prize weighs
//! as much as its remaining stock, the slice carries an explicit weight.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum reward name length in characters.
pub const REWARD_NAME_MAX: usize = 120;
/// Maximum reward description length in characters.
pub const REWARD_DESCRIPTION_MAX: usize = 2000;
/// Maximum coupon code length in characters.
pub const COUPON_CODE_MAX: usize = 64;
/// Longest claim window a prize may grant, in days.
pub const EXPIRY_DAYS_MAX: u32 = 3650;
/// Largest stock a prize may hold; the store keeps stock as a signed 32-bit
/// column.
pub const STOCK_MAX: u32 = 2_147_483_647;

/// Validation errors raised while building rewards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewardValidationError {
    #[error("reward name must not be empty")]
    EmptyName,
    #[error("reward name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("reward description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("coupon code must not be empty")]
    EmptyCouponCode,
    #[error("coupon code must be at most {max} characters")]
    CouponCodeTooLong { max: usize },
    #[error("coupon code must not contain whitespace")]
    CouponCodeWhitespace,
    #[error("slice weight must be a finite, non-negative number")]
    InvalidWeight,
    #[error("expiry must be at least one day")]
    ZeroExpiryDays,
    #[error("expiry must be at most {max} days")]
    ExpiryDaysTooLong { max: u32 },
    #[error("stock must be at most {max}")]
    StockTooLarge { max: u32 },
}

impl RewardValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::DescriptionTooLong { .. } => "description",
            Self::EmptyCouponCode | Self::CouponCodeTooLong { .. } | Self::CouponCodeWhitespace => {
                "couponCode"
            }
            Self::InvalidWeight => "weight",
            Self::ZeroExpiryDays | Self::ExpiryDaysTooLong { .. } => "expiryDays",
            Self::StockTooLarge { .. } => "stock",
        }
    }
}

/// Stable reward identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardId(Uuid);

impl RewardId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RewardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Coupon code revealed when a prize is claimed.
///
/// ## Invariants
/// - Non-empty, at most [`COUPON_CODE_MAX`] characters.
/// - Contains no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Validate and construct a coupon code.
    ///
    /// # Examples
    /// ```
    /// use spinwin::domain::CouponCode;
    ///
    /// assert!(CouponCode::new("SPRING10").is_ok());
    /// assert!(CouponCode::new("SPRING 10").is_err());
    /// ```
    pub fn new(code: impl Into<String>) -> Result<Self, RewardValidationError> {
        let code = code.into();
        if code.is_empty() {
            return Err(RewardValidationError::EmptyCouponCode);
        }
        if code.chars().any(char::is_whitespace) {
            return Err(RewardValidationError::CouponCodeWhitespace);
        }
        if code.chars().count() > COUPON_CODE_MAX {
            return Err(RewardValidationError::CouponCodeTooLong {
                max: COUPON_CODE_MAX,
            });
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CouponCode> for String {
    fn from(value: CouponCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CouponCode {
    type Error = RewardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Explicit weight of a try-again slice.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SliceWeight(f64);

impl SliceWeight {
    /// Validate a weight: finite and not negative.
    pub fn new(weight: f64) -> Result<Self, RewardValidationError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(RewardValidationError::InvalidWeight);
        }
        Ok(Self(weight))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<SliceWeight> for f64 {
    fn from(value: SliceWeight) -> Self {
        value.0
    }
}

impl TryFrom<f64> for SliceWeight {
    type Error = RewardValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// What a reward pays out when drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RewardKind {
    /// A winnable prize with finite stock.
    Prize { coupon_code: CouponCode, stock: u32 },
    /// The non-winning slice.
    TryAgain { weight: SliceWeight },
}

/// Input for [`RewardDefinition::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct RewardDraft {
    pub id: RewardId,
    pub name: String,
    pub description: String,
    pub kind: RewardKind,
    pub expiry_days: Option<u32>,
    pub requires_review: bool,
    pub created_at: DateTime<Utc>,
}

/// Administrator-defined reward taking part in the weighted draw.
///
/// ## Invariants
/// - `name` is trimmed, non-empty and at most [`REWARD_NAME_MAX`] characters.
/// - `expiry_days`, when set, lies in `1..=EXPIRY_DAYS_MAX`.
/// - prize stock is at most [`STOCK_MAX`].
#[derive(Debug, Clone, PartialEq)]
pub struct RewardDefinition {
    id: RewardId,
    name: String,
    description: String,
    kind: RewardKind,
    expiry_days: Option<u32>,
    requires_review: bool,
    created_at: DateTime<Utc>,
}

impl RewardDefinition {
    /// Validate a draft into a reward.
    pub fn new(draft: RewardDraft) -> Result<Self, RewardValidationError> {
        let RewardDraft {
            id,
            name,
            description,
            kind,
            expiry_days,
            requires_review,
            created_at,
        } = draft;

        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(RewardValidationError::EmptyName);
        }
        if name.chars().count() > REWARD_NAME_MAX {
            return Err(RewardValidationError::NameTooLong {
                max: REWARD_NAME_MAX,
            });
        }
        if description.chars().count() > REWARD_DESCRIPTION_MAX {
            return Err(RewardValidationError::DescriptionTooLong {
                max: REWARD_DESCRIPTION_MAX,
            });
        }
        match expiry_days {
            Some(0) => return Err(RewardValidationError::ZeroExpiryDays),
            Some(days) if days > EXPIRY_DAYS_MAX => {
                return Err(RewardValidationError::ExpiryDaysTooLong {
                    max: EXPIRY_DAYS_MAX,
                });
            }
            _ => {}
        }
        if matches!(kind, RewardKind::Prize { stock, .. } if stock > STOCK_MAX) {
            return Err(RewardValidationError::StockTooLarge { max: STOCK_MAX });
        }

        Ok(Self {
            id,
            name,
            description,
            kind,
            expiry_days,
            requires_review,
            created_at,
        })
    }

    pub fn id(&self) -> RewardId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn kind(&self) -> &RewardKind {
        &self.kind
    }

    pub fn expiry_days(&self) -> Option<u32> {
        self.expiry_days
    }

    pub fn requires_review(&self) -> bool {
        self.requires_review
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Coupon code for prizes, `None` for the try-again slice.
    pub fn coupon_code(&self) -> Option<&CouponCode> {
        match &self.kind {
            RewardKind::Prize { coupon_code, .. } => Some(coupon_code),
            RewardKind::TryAgain { .. } => None,
        }
    }

    /// Remaining stock for prizes, `None` for the try-again slice.
    pub fn stock(&self) -> Option<u32> {
        match self.kind {
            RewardKind::Prize { stock, .. } => Some(stock),
            RewardKind::TryAgain { .. } => None,
        }
    }

    pub fn is_prize(&self) -> bool {
        matches!(self.kind, RewardKind::Prize { .. })
    }

    /// Weight in the draw: remaining stock for prizes, explicit for slices.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use spinwin::domain::{CouponCode, RewardDefinition, RewardDraft, RewardId, RewardKind};
    ///
    /// let reward = RewardDefinition::new(RewardDraft {
    ///     id: RewardId::random(),
    ///     name: "Free coffee".into(),
    ///     description: String::new(),
    ///     kind: RewardKind::Prize {
    ///         coupon_code: CouponCode::new("COFFEE").expect("valid code"),
    ///         stock: 3,
    ///     },
    ///     expiry_days: None,
    ///     requires_review: false,
    ///     created_at: Utc::now(),
    /// })
    /// .expect("valid reward");
    /// assert_eq!(reward.weight(), 3.0);
    /// ```
    pub fn weight(&self) -> f64 {
        match self.kind {
            RewardKind::Prize { stock, .. } => f64::from(stock),
            RewardKind::TryAgain { weight } => weight.value(),
        }
    }

    /// Prizes need stock; the slice is always in the pool.
    pub fn is_eligible(&self) -> bool {
        match self.kind {
            RewardKind::Prize { stock, .. } => stock > 0,
            RewardKind::TryAgain { .. } => true,
        }
    }

    /// Decrement stock by one if any remains.
    ///
    /// Returns `false` (and leaves the reward untouched) for an empty prize or
    /// the try-again slice.
    pub fn take_one(&mut self) -> bool {
        match &mut self.kind {
            RewardKind::Prize { stock, .. } if *stock > 0 => {
                *stock -= 1;
                true
            }
            _ => false,
        }
    }

    /// When a prize won at `awarded_at` stops being claimable.
    ///
    /// Saturates at the latest representable instant.
    pub fn expiry_from(&self, awarded_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expiry_days.map(|days| {
            awarded_at
                .checked_add_signed(Duration::days(i64::from(days)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }
}
