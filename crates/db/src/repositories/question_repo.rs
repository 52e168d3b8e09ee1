//! Repository for the `questions` table.

use jejuqa_core::types::DbId;
use sqlx::PgConnection;

use crate::models::question::{CreateQuestion, Question};

const COLUMNS: &str = "id, author_id, title, content, accepted_answer_id, created_at, updated_at";

pub struct QuestionRepo;

impl QuestionRepo {
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateQuestion,
    ) -> Result<Question, sqlx::Error> {
        let query = format!(
            "INSERT INTO questions (author_id, title, content) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(input.author_id)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM questions WHERE id = $1");
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Like [`find_by_id`](Self::find_by_id) with `FOR UPDATE`, serializing
    /// concurrent adoptions of the same question.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM questions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn set_accepted_answer(
        conn: &mut PgConnection,
        id: DbId,
        answer_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE questions SET accepted_answer_id = $2 WHERE id = $1")
            .bind(id)
            .bind(answer_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
