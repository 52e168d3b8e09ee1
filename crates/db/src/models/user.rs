//! User entity model and DTOs.

use jejuqa_core::badges::UserActivity;
use jejuqa_core::store::UserRecord;
use jejuqa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub nickname: String,
    pub role: String,
    pub points: i64,
    pub total_answers: i64,
    pub adopted_answers: i64,
    pub adopt_rate: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserRecord {
    fn from(row: User) -> Self {
        Self {
            id: row.id,
            nickname: row.nickname,
            role: row.role,
            points: row.points,
            total_answers: row.total_answers,
            adopted_answers: row.adopted_answers,
            adopt_rate: row.adopt_rate,
        }
    }
}

/// DTO for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub nickname: String,
    pub role: String,
}

/// Aggregated counters backing badge conditions.
#[derive(Debug, Clone, FromRow)]
pub struct UserActivityRow {
    pub user_id: DbId,
    pub question_count: i64,
    pub answer_count: i64,
    pub adopted_count: i64,
    pub likes_received: i64,
    pub points: i64,
    pub points_earned: i64,
}

impl From<UserActivityRow> for UserActivity {
    fn from(row: UserActivityRow) -> Self {
        Self {
            user_id: row.user_id,
            question_count: row.question_count,
            answer_count: row.answer_count,
            adopted_count: row.adopted_count,
            likes_received: row.likes_received,
            points: row.points,
            points_earned: row.points_earned,
        }
    }
}
