//! Point ledger rows.

use jejuqa_core::points::PointTransaction;
use jejuqa_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `point_transactions` table.
#[derive(Debug, Clone, FromRow)]
pub struct PointTransactionRow {
    pub id: DbId,
    pub user_id: DbId,
    pub amount: i64,
    pub balance: i64,
    pub transaction_type: String,
    pub description: String,
    pub related_type: Option<String>,
    pub related_id: Option<DbId>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

impl From<PointTransactionRow> for PointTransaction {
    fn from(row: PointTransactionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            balance: row.balance,
            transaction_type: row.transaction_type,
            description: row.description,
            related_type: row.related_type,
            related_id: row.related_id,
            metadata: row.metadata,
            created_at: row.created_at,
        }
    }
}
