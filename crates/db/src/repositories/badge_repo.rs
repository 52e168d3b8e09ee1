//! Repository for `badges` and `user_badges`.

use jejuqa_core::types::DbId;
use sqlx::PgConnection;

use crate::models::badge::{BadgeRow, CreateBadge, EarnedBadgeRow, UserBadgeRow};

const COLUMNS: &str = "id, code, name, description, badge_type, condition, \
                       required_answers, required_adopt_rate, bonus_points, is_active";

pub struct BadgeRepo;

impl BadgeRepo {
    pub async fn create(conn: &mut PgConnection, input: &CreateBadge) -> Result<BadgeRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO badges \
                (code, name, description, badge_type, condition, \
                 required_answers, required_adopt_rate, bonus_points) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BadgeRow>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.badge_type)
            .bind(&input.condition)
            .bind(input.required_answers)
            .bind(input.required_adopt_rate)
            .bind(input.bonus_points)
            .fetch_one(conn)
            .await
    }

    pub async fn list_active(conn: &mut PgConnection) -> Result<Vec<BadgeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM badges WHERE is_active = true ORDER BY id");
        sqlx::query_as::<_, BadgeRow>(&query).fetch_all(conn).await
    }

    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Vec<EarnedBadgeRow>, sqlx::Error> {
        sqlx::query_as::<_, EarnedBadgeRow>(
            "SELECT b.id, b.code, b.name, b.description, b.badge_type, b.condition, \
                    b.required_answers, b.required_adopt_rate, b.bonus_points, b.is_active, \
                    ub.earned_at \
             FROM user_badges ub \
             JOIN badges b ON b.id = ub.badge_id \
             WHERE ub.user_id = $1 \
             ORDER BY ub.earned_at, ub.id",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }

    /// Record a grant. Returns `None` if the user already holds the badge.
    pub async fn grant(
        conn: &mut PgConnection,
        user_id: DbId,
        badge_id: DbId,
    ) -> Result<Option<UserBadgeRow>, sqlx::Error> {
        sqlx::query_as::<_, UserBadgeRow>(
            "INSERT INTO user_badges (user_id, badge_id) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_user_badges_user_badge DO NOTHING \
             RETURNING user_id, badge_id, earned_at",
        )
        .bind(user_id)
        .bind(badge_id)
        .fetch_optional(conn)
        .await
    }
}
