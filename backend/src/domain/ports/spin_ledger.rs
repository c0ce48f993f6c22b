//! Port for the spin outcome ledger.
//!
//! The ledger is the only place reward stock is decremented. Recording a
//! winning outcome and taking one unit of stock happen together or not at
//! all, which is what keeps concurrent spins from over-awarding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ParticipantRef, RedemptionCode, SpinId, SpinOutcome};

use super::define_port_error;

define_port_error! {
    /// Errors raised by spin ledger adapters.
    pub enum SpinLedgerError {
        /// Ledger connection could not be established.
        Connection { message: String } =>
            "spin ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "spin ledger query failed: {message}",
    }
}

/// Result of [`SpinLedger::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Stock was taken (for prizes) and the outcome stored.
    Recorded,
    /// The prize had no stock left or no longer exists. Nothing was written.
    StockDepleted,
    /// The redemption code was stored concurrently. Nothing was written.
    CodeTaken,
    /// The participant already has an outcome. Nothing was written.
    AlreadyParticipated,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpinLedger: Send + Sync {
    async fn find_by_id(&self, id: &SpinId) -> Result<Option<SpinOutcome>, SpinLedgerError>;

    async fn find_by_participant(
        &self,
        participant: &ParticipantRef,
    ) -> Result<Option<SpinOutcome>, SpinLedgerError>;

    /// Whether any stored outcome already carries `code`.
    async fn code_exists(&self, code: &RedemptionCode) -> Result<bool, SpinLedgerError>;

    /// Atomically store `outcome`.
    ///
    /// For a prize outcome the awarded reward's stock is decremented only if
    /// it is positive, in the same unit of work as the insert. Try-again
    /// outcomes touch no stock.
    async fn record(&self, outcome: &SpinOutcome) -> Result<RecordOutcome, SpinLedgerError>;

    /// Move a `pending` outcome to `claimed`. Returns `false` when the outcome
    /// is missing or no longer pending.
    async fn mark_claimed(
        &self,
        id: &SpinId,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool, SpinLedgerError>;

    /// Outcomes created at or after `since` (all when `None`), oldest first.
    async fn list_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SpinOutcome>, SpinLedgerError>;
}
