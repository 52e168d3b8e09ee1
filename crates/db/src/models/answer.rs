use jejuqa_core::store::AnswerRecord;
use jejuqa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `answers` table.
///
/// `adopted_at` is set exactly when the answer is its question's
/// `accepted_answer_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Answer {
    pub id: DbId,
    pub question_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub like_count: i64,
    pub adopted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Answer> for AnswerRecord {
    fn from(row: Answer) -> Self {
        Self {
            id: row.id,
            question_id: row.question_id,
            author_id: row.author_id,
            like_count: row.like_count,
            adopted_at: row.adopted_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnswer {
    pub question_id: DbId,
    pub author_id: DbId,
    pub content: String,
}
