//! Repository for the `answers` table.

use jejuqa_core::types::{DbId, Timestamp};
use sqlx::PgConnection;

use crate::models::answer::{Answer, CreateAnswer};

const COLUMNS: &str =
    "id, question_id, author_id, content, like_count, adopted_at, created_at, updated_at";

pub struct AnswerRepo;

impl AnswerRepo {
    pub async fn create(conn: &mut PgConnection, input: &CreateAnswer) -> Result<Answer, sqlx::Error> {
        let query = format!(
            "INSERT INTO answers (question_id, author_id, content) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Answer>(&query)
            .bind(input.question_id)
            .bind(input.author_id)
            .bind(&input.content)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Answer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM answers WHERE id = $1");
        sqlx::query_as::<_, Answer>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn set_adopted_at(
        conn: &mut PgConnection,
        id: DbId,
        adopted_at: Option<Timestamp>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE answers SET adopted_at = $2 WHERE id = $1")
            .bind(id)
            .bind(adopted_at)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// `(total, adopted)` answer counts for one author.
    pub async fn count_by_author(
        conn: &mut PgConnection,
        author_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as("SELECT COUNT(*), COUNT(adopted_at) FROM answers WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(conn)
            .await
    }

    pub async fn set_like_count(
        conn: &mut PgConnection,
        id: DbId,
        like_count: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE answers SET like_count = $2 WHERE id = $1")
            .bind(id)
            .bind(like_count)
            .execute(conn)
            .await?;
        Ok(())
    }
}
