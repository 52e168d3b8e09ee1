//! Badge definitions and grants.

use jejuqa_core::badges::{Badge, EarnedBadge, UserBadge};
use jejuqa_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

/// A row from the `badges` table.
#[derive(Debug, Clone, FromRow)]
pub struct BadgeRow {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub badge_type: String,
    pub condition: serde_json::Value,
    pub required_answers: i64,
    pub required_adopt_rate: Option<f64>,
    pub bonus_points: i64,
    pub is_active: bool,
}

impl From<BadgeRow> for Badge {
    fn from(row: BadgeRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            badge_type: row.badge_type,
            condition: row.condition,
            required_answers: row.required_answers,
            required_adopt_rate: row.required_adopt_rate,
            bonus_points: row.bonus_points,
            is_active: row.is_active,
        }
    }
}

/// A badge joined with the time the user earned it.
#[derive(Debug, Clone, FromRow)]
pub struct EarnedBadgeRow {
    #[sqlx(flatten)]
    pub badge: BadgeRow,
    pub earned_at: Timestamp,
}

impl From<EarnedBadgeRow> for EarnedBadge {
    fn from(row: EarnedBadgeRow) -> Self {
        Self {
            badge: row.badge.into(),
            earned_at: row.earned_at,
        }
    }
}

/// A row from the `user_badges` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserBadgeRow {
    pub user_id: DbId,
    pub badge_id: DbId,
    pub earned_at: Timestamp,
}

impl From<UserBadgeRow> for UserBadge {
    fn from(row: UserBadgeRow) -> Self {
        Self {
            user_id: row.user_id,
            badge_id: row.badge_id,
            earned_at: row.earned_at,
        }
    }
}

/// DTO for creating a badge definition.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBadge {
    pub code: String,
    pub name: String,
    pub description: String,
    pub badge_type: String,
    pub condition: serde_json::Value,
    pub required_answers: i64,
    pub required_adopt_rate: Option<f64>,
    pub bonus_points: i64,
}
