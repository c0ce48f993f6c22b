//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::{
    CouponCode, RandomCodeGenerator, RedemptionCode, RedemptionCodeGenerator, RewardDefinition,
    RewardDraft, RewardDraw, RewardId, RewardKind, SliceWeight,
};

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_days(&self, days: i64) {
        *self.lock_clock() += TimeDelta::days(days);
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Draw that always lands on the same point of the wheel.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl RewardDraw for FixedDraw {
    fn draw(&self, _total: f64) -> f64 {
        self.0
    }
}

/// Hands out queued codes first, then random ones.
#[derive(Debug, Default)]
pub struct ScriptedCodes(Mutex<VecDeque<RedemptionCode>>);

impl ScriptedCodes {
    /// Queue `codes`, which must be valid redemption codes.
    pub fn new(codes: &[&str]) -> Self {
        let queue = codes
            .iter()
            .filter_map(|code| RedemptionCode::new(*code).ok())
            .collect();
        Self(Mutex::new(queue))
    }
}

impl RedemptionCodeGenerator for ScriptedCodes {
    fn generate(&self) -> RedemptionCode {
        let next = self
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        next.unwrap_or_else(|| RandomCodeGenerator.generate())
    }
}

/// Prize definition with the coupon code derived from `name`.
pub fn prize(name: &str, stock: u32, created_at: DateTime<Utc>) -> RewardDefinition {
    prize_with(name, stock, created_at, None, false)
}

/// Prize definition with expiry and review requirement.
pub fn prize_with(
    name: &str,
    stock: u32,
    created_at: DateTime<Utc>,
    expiry_days: Option<u32>,
    requires_review: bool,
) -> RewardDefinition {
    let coupon: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    let draft = RewardDraft {
        id: RewardId::random(),
        name: name.to_owned(),
        description: format!("{name} prize"),
        kind: RewardKind::Prize {
            coupon_code: match CouponCode::new(coupon) {
                Ok(code) => code,
                Err(error) => panic!("test coupon derived from {name:?} is invalid: {error}"),
            },
            stock,
        },
        expiry_days,
        requires_review,
        created_at,
    };
    match RewardDefinition::new(draft) {
        Ok(reward) => reward,
        Err(error) => panic!("test prize {name:?} is invalid: {error}"),
    }
}

/// Try-again slice with the given weight.
pub fn try_again_slice(weight: f64, created_at: DateTime<Utc>) -> RewardDefinition {
    let weight = match SliceWeight::new(weight) {
        Ok(weight) => weight,
        Err(error) => panic!("test weight {weight} is invalid: {error}"),
    };
    let draft = RewardDraft {
        id: RewardId::random(),
        name: "Try again".to_owned(),
        description: String::new(),
        kind: RewardKind::TryAgain { weight },
        expiry_days: None,
        requires_review: false,
        created_at,
    };
    match RewardDefinition::new(draft) {
        Ok(reward) => reward,
        Err(error) => panic!("test slice is invalid: {error}"),
    }
}
