//! Diesel row structs. Internal to the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{reviews, rewards, spin_outcomes};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rewards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RewardRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub kind: String,
    pub coupon_code: Option<String>,
    pub stock: Option<i32>,
    pub weight: Option<f64>,
    pub expiry_days: Option<i32>,
    pub requires_review: bool,
    pub created_at: DateTime<Utc>,
}

/// Full reward row, used for both inserts and whole-row updates.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = rewards)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RewardRecord<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub kind: &'static str,
    pub coupon_code: Option<&'a str>,
    pub stock: Option<i32>,
    pub weight: Option<f64>,
    pub expiry_days: Option<i32>,
    pub requires_review: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = spin_outcomes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SpinOutcomeRow {
    pub id: Uuid,
    pub participant_kind: String,
    pub participant_id: Uuid,
    pub reward_id: Option<Uuid>,
    pub prize_name: Option<String>,
    pub prize_description: Option<String>,
    pub prize_coupon_code: Option<String>,
    pub prize_requires_review: bool,
    pub redemption_code: Option<String>,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = spin_outcomes)]
pub(crate) struct NewSpinOutcomeRow<'a> {
    pub id: Uuid,
    pub participant_kind: &'static str,
    pub participant_id: Uuid,
    pub reward_id: Option<Uuid>,
    pub prize_name: Option<&'a str>,
    pub prize_description: Option<&'a str>,
    pub prize_coupon_code: Option<&'a str>,
    pub prize_requires_review: bool,
    pub redemption_code: Option<&'a str>,
    pub status: &'static str,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub feedback_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub rating: Option<i16>,
    pub comment: Option<&'a str>,
    pub feedback_status: &'static str,
    pub created_at: DateTime<Utc>,
}

/// Mutable review columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reviews)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ReviewFeedbackUpdate<'a> {
    pub rating: Option<i16>,
    pub comment: Option<&'a str>,
    pub feedback_status: &'static str,
}
