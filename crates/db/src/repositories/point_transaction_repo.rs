//! Repository for the append-only `point_transactions` ledger.

use jejuqa_core::points::NewPointTransaction;
use jejuqa_core::types::DbId;
use sqlx::PgConnection;

use crate::models::point_transaction::PointTransactionRow;

const COLUMNS: &str = "id, user_id, amount, balance, transaction_type, description, \
                       related_type, related_id, metadata, created_at";

pub struct PointTransactionRepo;

impl PointTransactionRepo {
    pub async fn insert(
        conn: &mut PgConnection,
        entry: &NewPointTransaction,
        balance: i64,
    ) -> Result<PointTransactionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO point_transactions \
                (user_id, amount, balance, transaction_type, description, \
                 related_type, related_id, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PointTransactionRow>(&query)
            .bind(entry.user_id)
            .bind(entry.amount)
            .bind(balance)
            .bind(&entry.transaction_type)
            .bind(&entry.description)
            .bind(&entry.related_type)
            .bind(entry.related_id)
            .bind(&entry.metadata)
            .fetch_one(conn)
            .await
    }

    /// `(sum(amount), count(*))` over a user's ledger.
    pub async fn summary(conn: &mut PgConnection, user_id: DbId) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT, COUNT(*) \
             FROM point_transactions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(conn)
        .await
    }

    /// Newest first; `id` breaks ties between rows from one transaction.
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointTransactionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM point_transactions \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PointTransactionRow>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(conn)
            .await
    }
}
