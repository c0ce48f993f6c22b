//! Diesel table definitions. Must match `migrations/` exactly.

diesel::table! {
    /// Wheel slices. Prize rows carry `coupon_code` and `stock`; the
    /// try-again row carries `weight`.
    rewards (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        kind -> Varchar,
        coupon_code -> Nullable<Varchar>,
        stock -> Nullable<Int4>,
        weight -> Nullable<Float8>,
        expiry_days -> Nullable<Int4>,
        requires_review -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per participant. Prize columns snapshot the reward at award
    /// time and are all null for try-again outcomes.
    spin_outcomes (id) {
        id -> Uuid,
        participant_kind -> Varchar,
        participant_id -> Uuid,
        reward_id -> Nullable<Uuid>,
        prize_name -> Nullable<Varchar>,
        prize_description -> Nullable<Text>,
        prize_coupon_code -> Nullable<Varchar>,
        prize_requires_review -> Bool,
        redemption_code -> Nullable<Varchar>,
        status -> Varchar,
        expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        claimed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    reviews (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Text,
        phone -> Nullable<Text>,
        rating -> Nullable<Int2>,
        comment -> Nullable<Text>,
        feedback_status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(rewards, spin_outcomes, reviews);
