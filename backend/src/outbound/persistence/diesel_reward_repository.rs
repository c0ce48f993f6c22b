//! PostgreSQL-backed [`RewardRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{RewardRepository, RewardRepositoryError};
use crate::domain::{
    CouponCode, RewardDefinition, RewardDraft, RewardId, RewardKind, SliceWeight,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{RewardRecord, RewardRow};
use super::pool::{DbPool, PoolError};
use super::schema::rewards;

const KIND_PRIZE: &str = "prize";
const KIND_TRY_AGAIN: &str = "try_again";

/// Diesel adapter for reward definitions.
#[derive(Clone)]
pub struct DieselRewardRepository {
    pool: DbPool,
}

impl DieselRewardRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RewardRepositoryError {
    map_basic_pool_error(error, RewardRepositoryError::connection)
}

fn map_diesel_error(error: &diesel::result::Error) -> RewardRepositoryError {
    map_basic_diesel_error(
        error,
        RewardRepositoryError::query,
        RewardRepositoryError::connection,
    )
}

/// Writes fail on the coupon uniqueness constraint as a typed duplicate.
fn map_write_error(
    error: &diesel::result::Error,
    reward: &RewardDefinition,
) -> RewardRepositoryError {
    match (unique_violation(error), reward.coupon_code()) {
        (Some("rewards_coupon_code_key"), Some(code)) => {
            RewardRepositoryError::duplicate_coupon_code(code.as_str())
        }
        _ => map_diesel_error(error),
    }
}

fn to_db_int(value: u32, column: &str) -> Result<i32, RewardRepositoryError> {
    i32::try_from(value)
        .map_err(|_| RewardRepositoryError::query(format!("{column} {value} exceeds column range")))
}

fn from_db_int(value: i32, column: &str) -> Result<u32, RewardRepositoryError> {
    u32::try_from(value)
        .map_err(|_| RewardRepositoryError::query(format!("stored {column} {value} is negative")))
}

fn record_for(reward: &RewardDefinition) -> Result<RewardRecord<'_>, RewardRepositoryError> {
    let (kind, coupon_code, stock, weight) = match reward.kind() {
        RewardKind::Prize { coupon_code, stock } => (
            KIND_PRIZE,
            Some(coupon_code.as_str()),
            Some(to_db_int(*stock, "stock")?),
            None,
        ),
        RewardKind::TryAgain { weight } => (KIND_TRY_AGAIN, None, None, Some(weight.value())),
    };
    Ok(RewardRecord {
        id: *reward.id().as_uuid(),
        name: reward.name(),
        description: reward.description(),
        kind,
        coupon_code,
        stock,
        weight,
        expiry_days: reward
            .expiry_days()
            .map(|days| to_db_int(days, "expiry_days"))
            .transpose()?,
        requires_review: reward.requires_review(),
        created_at: reward.created_at(),
    })
}

fn row_to_reward(row: RewardRow) -> Result<RewardDefinition, RewardRepositoryError> {
    let id = row.id;
    let corrupt = move |detail: String| {
        warn!(reward_id = %id, detail = %detail, "stored reward row is inconsistent");
        RewardRepositoryError::query(format!("reward {id} is inconsistent: {detail}"))
    };
    let kind = match (row.kind.as_str(), row.coupon_code, row.stock, row.weight) {
        (KIND_PRIZE, Some(code), Some(stock), _) => RewardKind::Prize {
            coupon_code: CouponCode::new(code).map_err(|err| corrupt(err.to_string()))?,
            stock: from_db_int(stock, "stock")?,
        },
        (KIND_TRY_AGAIN, _, _, Some(weight)) => RewardKind::TryAgain {
            weight: SliceWeight::new(weight).map_err(|err| corrupt(err.to_string()))?,
        },
        (other, ..) => return Err(corrupt(format!("kind {other:?} is missing its columns"))),
    };
    RewardDefinition::new(RewardDraft {
        id: RewardId::from_uuid(id),
        name: row.name,
        description: row.description,
        kind,
        expiry_days: row
            .expiry_days
            .map(|days| from_db_int(days, "expiry_days"))
            .transpose()?,
        requires_review: row.requires_review,
        created_at: row.created_at,
    })
    .map_err(|err| RewardRepositoryError::query(err.to_string()))
}

fn rows_to_rewards(rows: Vec<RewardRow>) -> Result<Vec<RewardDefinition>, RewardRepositoryError> {
    rows.into_iter().map(row_to_reward).collect()
}

#[async_trait]
impl RewardRepository for DieselRewardRepository {
    async fn insert(&self, reward: &RewardDefinition) -> Result<(), RewardRepositoryError> {
        let record = record_for(reward)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(rewards::table)
            .values(&record)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(&err, reward))
    }

    async fn update(&self, reward: &RewardDefinition) -> Result<bool, RewardRepositoryError> {
        let record = record_for(reward)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(rewards::table.find(record.id))
            .set(&record)
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(&err, reward))?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &RewardId) -> Result<bool, RewardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(rewards::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        Ok(affected > 0)
    }

    async fn find_by_id(
        &self,
        id: &RewardId,
    ) -> Result<Option<RewardDefinition>, RewardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RewardRow> = rewards::table
            .find(*id.as_uuid())
            .select(RewardRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_reward).transpose()
    }

    async fn list_all(&self) -> Result<Vec<RewardDefinition>, RewardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RewardRow> = rewards::table
            .order((rewards::created_at.asc(), rewards::id.asc()))
            .select(RewardRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        rows_to_rewards(rows)
    }

    async fn list_eligible(&self) -> Result<Vec<RewardDefinition>, RewardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RewardRow> = rewards::table
            .filter(
                rewards::kind
                    .eq(KIND_TRY_AGAIN)
                    .or(rewards::stock.gt(0)),
            )
            .order((rewards::created_at.asc(), rewards::id.asc()))
            .select(RewardRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        rows_to_rewards(rows)
    }
}
