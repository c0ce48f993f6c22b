//! PostgreSQL-backed [`SpinLedger`].
//!
//! `record` runs the stock decrement and the outcome insert in one
//! transaction. The decrement is conditional on `stock > 0`, so concurrent
//! spins serialise on the reward row and only as many succeed as there were
//! units left. Unique constraints on the participant and the redemption code
//! turn the remaining races into typed [`RecordOutcome`] values.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{RecordOutcome, SpinLedger, SpinLedgerError};
use crate::domain::{
    AwardedPrize, ClaimStatus, CouponCode, ParseLabelError, ParticipantRef, RedemptionCode,
    RewardId, SpinId, SpinOutcome, SpinOutcomeDraft,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{NewSpinOutcomeRow, SpinOutcomeRow};
use super::pool::{DbPool, PoolError};
use super::schema::{rewards, spin_outcomes};

const PARTICIPANT_CONSTRAINT: &str = "spin_outcomes_participant_key";
const CODE_CONSTRAINT: &str = "spin_outcomes_redemption_code_key";

/// Diesel adapter for the spin outcome ledger.
#[derive(Clone)]
pub struct DieselSpinLedger {
    pool: DbPool,
}

impl DieselSpinLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SpinLedgerError {
    map_basic_pool_error(error, SpinLedgerError::connection)
}

fn map_diesel_error(error: &DieselError) -> SpinLedgerError {
    map_basic_diesel_error(error, SpinLedgerError::query, SpinLedgerError::connection)
}

/// Translate a failed `record` transaction.
fn map_record_error(error: &DieselError) -> Result<RecordOutcome, SpinLedgerError> {
    match unique_violation(error) {
        Some(PARTICIPANT_CONSTRAINT) => Ok(RecordOutcome::AlreadyParticipated),
        Some(CODE_CONSTRAINT) => Ok(RecordOutcome::CodeTaken),
        _ => Err(map_diesel_error(error)),
    }
}

fn new_row(outcome: &SpinOutcome) -> NewSpinOutcomeRow<'_> {
    let participant = outcome.participant();
    let prize = outcome.prize();
    NewSpinOutcomeRow {
        id: *outcome.id().as_uuid(),
        participant_kind: participant.kind.as_str(),
        participant_id: participant.id,
        reward_id: prize.map(|p| *p.reward_id.as_uuid()),
        prize_name: prize.map(|p| p.name.as_str()),
        prize_description: prize.map(|p| p.description.as_str()),
        prize_coupon_code: prize.map(|p| p.coupon_code.as_str()),
        prize_requires_review: prize.is_some_and(|p| p.requires_review),
        redemption_code: outcome.redemption_code().map(RedemptionCode::as_str),
        status: outcome.status().as_str(),
        expires_at: outcome.expires_at(),
        created_at: outcome.created_at(),
        claimed_at: outcome.claimed_at(),
    }
}

fn row_to_outcome(row: SpinOutcomeRow) -> Result<SpinOutcome, SpinLedgerError> {
    let id = row.id;
    let corrupt =
        move |detail: String| SpinLedgerError::query(format!("spin {id} is inconsistent: {detail}"));

    let kind = row
        .participant_kind
        .parse()
        .map_err(|err: ParseLabelError| corrupt(err.to_string()))?;
    let status: ClaimStatus = row
        .status
        .parse()
        .map_err(|err: ParseLabelError| corrupt(err.to_string()))?;
    let prize = match (row.reward_id, row.prize_name, row.prize_coupon_code) {
        (Some(reward_id), Some(name), Some(coupon_code)) => Some(AwardedPrize {
            reward_id: RewardId::from_uuid(reward_id),
            name,
            description: row.prize_description.unwrap_or_default(),
            coupon_code: CouponCode::new(coupon_code).map_err(|err| corrupt(err.to_string()))?,
            requires_review: row.prize_requires_review,
        }),
        (None, None, None) => None,
        _ => return Err(corrupt("prize columns are partially set".to_owned())),
    };
    let redemption_code = row
        .redemption_code
        .map(RedemptionCode::new)
        .transpose()
        .map_err(|err| corrupt(err.to_string()))?;

    SpinOutcome::restore(SpinOutcomeDraft {
        id: SpinId::from_uuid(id),
        participant: ParticipantRef::new(kind, row.participant_id),
        prize,
        redemption_code,
        status,
        expires_at: row.expires_at,
        created_at: row.created_at,
        claimed_at: row.claimed_at,
    })
    .map_err(|err| corrupt(err.to_string()))
}

fn rows_to_outcomes(rows: Vec<SpinOutcomeRow>) -> Result<Vec<SpinOutcome>, SpinLedgerError> {
    rows.into_iter().map(row_to_outcome).collect()
}

#[async_trait]
impl SpinLedger for DieselSpinLedger {
    async fn find_by_id(&self, id: &SpinId) -> Result<Option<SpinOutcome>, SpinLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SpinOutcomeRow> = spin_outcomes::table
            .find(*id.as_uuid())
            .select(SpinOutcomeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_outcome).transpose()
    }

    async fn find_by_participant(
        &self,
        participant: &ParticipantRef,
    ) -> Result<Option<SpinOutcome>, SpinLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SpinOutcomeRow> = spin_outcomes::table
            .filter(spin_outcomes::participant_kind.eq(participant.kind.as_str()))
            .filter(spin_outcomes::participant_id.eq(participant.id))
            .select(SpinOutcomeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_outcome).transpose()
    }

    async fn code_exists(&self, code: &RedemptionCode) -> Result<bool, SpinLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            spin_outcomes::table.filter(spin_outcomes::redemption_code.eq(code.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err))
    }

    async fn record(&self, outcome: &SpinOutcome) -> Result<RecordOutcome, SpinLedgerError> {
        let row = new_row(outcome);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    if let Some(reward_id) = row.reward_id {
                        let taken = diesel::update(
                            rewards::table
                                .filter(rewards::id.eq(reward_id))
                                .filter(rewards::stock.gt(0)),
                        )
                        .set(rewards::stock.eq(rewards::stock - 1))
                        .execute(conn)
                        .await?;
                        if taken == 0 {
                            return Ok(RecordOutcome::StockDepleted);
                        }
                    }

                    diesel::insert_into(spin_outcomes::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(RecordOutcome::Recorded)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(recorded) => Ok(recorded),
            Err(err) => {
                debug!(spin_id = %outcome.id(), "spin record transaction rolled back");
                map_record_error(&err)
            }
        }
    }

    async fn mark_claimed(
        &self,
        id: &SpinId,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool, SpinLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(
            spin_outcomes::table
                .filter(spin_outcomes::id.eq(id.as_uuid()))
                .filter(spin_outcomes::status.eq(ClaimStatus::Pending.as_str())),
        )
        .set((
            spin_outcomes::status.eq(ClaimStatus::Claimed.as_str()),
            spin_outcomes::claimed_at.eq(Some(claimed_at)),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err))?;
        Ok(affected > 0)
    }

    async fn list_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SpinOutcome>, SpinLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = spin_outcomes::table
            .select(SpinOutcomeRow::as_select())
            .order((spin_outcomes::created_at.asc(), spin_outcomes::id.asc()))
            .into_boxed();
        if let Some(since) = since {
            query = query.filter(spin_outcomes::created_at.ge(since));
        }
        let rows = query
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        rows_to_outcomes(rows)
    }
}
