//! Repository for the `users` table.

use jejuqa_core::stats::AnswerStats;
use jejuqa_core::types::DbId;
use sqlx::PgConnection;

use crate::models::user::{CreateUser, User, UserActivityRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, nickname, role, points, total_answers, adopted_answers, \
                       adopt_rate, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (nickname, role) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.nickname)
            .bind(&input.role)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Read the point balance and hold a row lock until the transaction ends.
    pub async fn lock_points(conn: &mut PgConnection, id: DbId) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT points FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn set_points(conn: &mut PgConnection, id: DbId, points: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET points = $2 WHERE id = $1")
            .bind(id)
            .bind(points)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn update_answer_stats(
        conn: &mut PgConnection,
        id: DbId,
        stats: &AnswerStats,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET total_answers = $2, adopted_answers = $3, adopt_rate = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(stats.total_answers)
        .bind(stats.adopted_answers)
        .bind(stats.adopt_rate)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Counters used by badge conditions, computed from source tables.
    ///
    /// `points_earned` is the sum of positive ledger amounts.
    pub async fn activity(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<UserActivityRow>, sqlx::Error> {
        sqlx::query_as::<_, UserActivityRow>(
            "SELECT u.id AS user_id, \
                (SELECT COUNT(*) FROM questions q WHERE q.author_id = u.id) AS question_count, \
                (SELECT COUNT(*) FROM answers a WHERE a.author_id = u.id) AS answer_count, \
                (SELECT COUNT(*) FROM answers a \
                    WHERE a.author_id = u.id AND a.adopted_at IS NOT NULL) AS adopted_count, \
                (SELECT COALESCE(SUM(a.like_count), 0)::BIGINT FROM answers a \
                    WHERE a.author_id = u.id) AS likes_received, \
                u.points, \
                (SELECT COALESCE(SUM(t.amount), 0)::BIGINT FROM point_transactions t \
                    WHERE t.user_id = u.id AND t.amount > 0) AS points_earned \
             FROM users u WHERE u.id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }
}
