use jejuqa_core::store::QuestionRecord;
use jejuqa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content: String,
    pub accepted_answer_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Question> for QuestionRecord {
    fn from(row: Question) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            accepted_answer_id: row.accepted_answer_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestion {
    pub author_id: DbId,
    pub title: String,
    pub content: String,
}
