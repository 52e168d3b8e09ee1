//! Point ledger: append-only transactions plus a denormalized balance.
//!
//! Every credit or debit is written as a `point_transactions` row whose
//! `balance` column snapshots the user's total after the change, and the
//! same delta is applied to `users.points`. The two must always agree;
//! [`PointLedger::validate_integrity`] detects drift and
//! [`PointLedger::repair_integrity`] rewrites the balance from the ledger.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::store::{CommunityStore, StoreTx};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Credit for an answer adopted by the question author.
pub const TX_ANSWER_ACCEPTED: &str = "ANSWER_ACCEPTED";
/// Bonus attached to a newly earned badge.
pub const TX_BADGE_EARNED: &str = "BADGE_EARNED";
pub const TX_QUESTION_CREATED: &str = "QUESTION_CREATED";
pub const TX_ANSWER_CREATED: &str = "ANSWER_CREATED";
/// Manual credit or debit by an administrator.
pub const TX_ADMIN_ADJUSTMENT: &str = "ADMIN_ADJUSTMENT";
pub const TX_PENALTY: &str = "PENALTY";

/// All valid `point_transactions.transaction_type` values.
pub const VALID_TRANSACTION_TYPES: &[&str] = &[
    TX_ANSWER_ACCEPTED,
    TX_BADGE_EARNED,
    TX_QUESTION_CREATED,
    TX_ANSWER_CREATED,
    TX_ADMIN_ADJUSTMENT,
    TX_PENALTY,
];

/// `related_type` values.
pub const RELATED_ANSWER: &str = "ANSWER";
pub const RELATED_QUESTION: &str = "QUESTION";
pub const RELATED_BADGE: &str = "BADGE";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a single ledger write. `amount` is signed: positive credits,
/// negative debits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPointTransaction {
    pub user_id: DbId,
    pub amount: i64,
    pub transaction_type: String,
    pub description: String,
    pub related_type: Option<String>,
    pub related_id: Option<DbId>,
    pub metadata: serde_json::Value,
}

impl NewPointTransaction {
    pub fn new(
        user_id: DbId,
        amount: i64,
        transaction_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            amount,
            transaction_type: transaction_type.into(),
            description: description.into(),
            related_type: None,
            related_id: None,
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    /// Link the entry to the entity that caused it.
    pub fn with_related(mut self, related_type: impl Into<String>, related_id: DbId) -> Self {
        self.related_type = Some(related_type.into());
        self.related_id = Some(related_id);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A persisted ledger row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub amount: i64,
    /// User's total immediately after this transaction.
    pub balance: i64,
    pub transaction_type: String,
    pub description: String,
    pub related_type: Option<String>,
    pub related_id: Option<DbId>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

/// Sum and count of a user's ledger rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerSummary {
    pub total_amount: i64,
    pub transaction_count: i64,
}

/// Outcome of comparing `users.points` against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub user_id: DbId,
    pub is_valid: bool,
    /// The balance currently stored on the user row.
    pub actual_points: i64,
    /// The balance implied by the ledger.
    pub expected_points: i64,
    /// `actual_points - expected_points`.
    pub discrepancy: i64,
    pub transaction_count: i64,
}

impl IntegrityReport {
    pub fn compare(user_id: DbId, actual_points: i64, summary: LedgerSummary) -> Self {
        let discrepancy = actual_points - summary.total_amount;
        Self {
            user_id,
            is_valid: discrepancy == 0,
            actual_points,
            expected_points: summary.total_amount,
            discrepancy,
            transaction_count: summary.transaction_count,
        }
    }
}

/// Outcome of [`PointLedger::repair_integrity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub user_id: DbId,
    pub repaired: bool,
    pub before: i64,
    pub after: i64,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a transaction type is one of the accepted values.
pub fn validate_transaction_type(transaction_type: &str) -> Result<(), String> {
    if VALID_TRANSACTION_TYPES.contains(&transaction_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid transaction type '{transaction_type}'. Must be one of: {}",
            VALID_TRANSACTION_TYPES.join(", ")
        ))
    }
}

/// Apply `amount` to `balance`, rejecting debits that would go negative.
pub fn apply_delta(balance: i64, amount: i64) -> CoreResult<i64> {
    let next = balance
        .checked_add(amount)
        .ok_or_else(|| CoreError::Validation("Point balance overflow".to_string()))?;
    if amount < 0 && next < 0 {
        return Err(CoreError::InsufficientPoints { balance, amount });
    }
    Ok(next)
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// The only sanctioned path for changing a user's point balance.
#[derive(Clone)]
pub struct PointLedger {
    store: Arc<dyn CommunityStore>,
}

impl PointLedger {
    pub fn new(store: Arc<dyn CommunityStore>) -> Self {
        Self { store }
    }

    /// Credit or debit a user in a transaction of its own.
    pub async fn add_points(&self, entry: NewPointTransaction) -> CoreResult<PointTransaction> {
        let mut tx = self.store.begin().await?;
        let record = Self::add_points_in(tx.as_mut(), &entry).await?;
        tx.commit().await?;

        tracing::info!(
            user_id = record.user_id,
            amount = record.amount,
            balance = record.balance,
            transaction_type = %record.transaction_type,
            "Points recorded"
        );
        Ok(record)
    }

    /// Credit or debit a user inside the caller's transaction.
    ///
    /// Locks the user's balance, validates the change, appends the ledger
    /// row and moves `users.points` by the same delta.
    pub async fn add_points_in(
        tx: &mut dyn StoreTx,
        entry: &NewPointTransaction,
    ) -> CoreResult<PointTransaction> {
        if entry.amount == 0 {
            return Err(CoreError::Validation(
                "Point amount must be non-zero".to_string(),
            ));
        }
        validate_transaction_type(&entry.transaction_type).map_err(CoreError::Validation)?;

        let balance = tx
            .lock_user_points(entry.user_id)
            .await?
            .ok_or(CoreError::UserNotFound(entry.user_id))?;
        let next = apply_delta(balance, entry.amount)?;

        let record = tx.insert_point_transaction(entry, next).await?;
        tx.set_user_points(entry.user_id, next).await?;
        Ok(record)
    }

    /// Current balance from the user row.
    pub async fn balance(&self, user_id: DbId) -> CoreResult<i64> {
        let mut tx = self.store.begin().await?;
        let user = tx
            .find_user(user_id)
            .await?
            .ok_or(CoreError::UserNotFound(user_id))?;
        tx.commit().await?;
        Ok(user.points)
    }

    /// A page of the user's ledger, newest first.
    pub async fn list_transactions(
        &self,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> CoreResult<Vec<PointTransaction>> {
        let mut tx = self.store.begin().await?;
        if tx.find_user(user_id).await?.is_none() {
            return Err(CoreError::UserNotFound(user_id));
        }
        let rows = tx.list_point_transactions(user_id, limit, offset).await?;
        tx.commit().await?;
        Ok(rows)
    }

    /// Compare the stored balance against the sum of the ledger.
    pub async fn validate_integrity(&self, user_id: DbId) -> CoreResult<IntegrityReport> {
        let mut tx = self.store.begin().await?;
        let report = Self::integrity_in(tx.as_mut(), user_id).await?;
        tx.commit().await?;
        Ok(report)
    }

    /// Overwrite `users.points` with the ledger sum when the two disagree.
    pub async fn repair_integrity(&self, user_id: DbId) -> CoreResult<RepairReport> {
        let mut tx = self.store.begin().await?;
        let report = Self::integrity_in(tx.as_mut(), user_id).await?;

        if report.is_valid {
            tx.commit().await?;
            return Ok(RepairReport {
                user_id,
                repaired: false,
                before: report.actual_points,
                after: report.actual_points,
            });
        }

        tx.set_user_points(user_id, report.expected_points).await?;
        tx.commit().await?;

        tracing::warn!(
            user_id,
            before = report.actual_points,
            after = report.expected_points,
            discrepancy = report.discrepancy,
            "Repaired point balance drift"
        );

        Ok(RepairReport {
            user_id,
            repaired: true,
            before: report.actual_points,
            after: report.expected_points,
        })
    }

    async fn integrity_in(tx: &mut dyn StoreTx, user_id: DbId) -> CoreResult<IntegrityReport> {
        let actual = tx
            .lock_user_points(user_id)
            .await?
            .ok_or(CoreError::UserNotFound(user_id))?;
        let summary = tx.ledger_summary(user_id).await?;
        Ok(IntegrityReport::compare(user_id, actual, summary))
    }
}
