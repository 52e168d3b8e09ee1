//! Badges: reference data, declarative conditions and the evaluator that
//! grants them.
//!
//! Badge rows are seeded reference data. Each carries a JSON `condition`
//! (see [`condition::BadgeCondition`]), optional answer-count and
//! adoption-rate gates, and an optional point bonus paid through the
//! ledger on grant.

pub mod condition;
pub mod evaluator;
pub mod queue;

use serde::Serialize;

use crate::stats;
use crate::types::{DbId, Timestamp};

pub use condition::{evaluate, BadgeCondition, BadgeEvaluation};
pub use evaluator::{BadgeEvaluator, BadgeProgress, BatchEvaluation, UserFailure, UserGrants};
pub use queue::BadgeCheckQueue;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Awarded for sustained, well-adopted answers in a category.
pub const BADGE_TYPE_CATEGORY_EXPERT: &str = "CATEGORY_EXPERT";
/// Awarded for overall activity milestones.
pub const BADGE_TYPE_ACTIVITY_LEVEL: &str = "ACTIVITY_LEVEL";
pub const BADGE_TYPE_ACHIEVEMENT: &str = "ACHIEVEMENT";
pub const BADGE_TYPE_SPECIAL: &str = "SPECIAL";

/// All valid `badges.badge_type` values.
pub const VALID_BADGE_TYPES: &[&str] = &[
    BADGE_TYPE_CATEGORY_EXPERT,
    BADGE_TYPE_ACTIVITY_LEVEL,
    BADGE_TYPE_ACHIEVEMENT,
    BADGE_TYPE_SPECIAL,
];

/// Badge types whose holders receive the adoption bonus.
pub const ADOPTION_BONUS_BADGE_TYPES: &[&str] =
    &[BADGE_TYPE_CATEGORY_EXPERT, BADGE_TYPE_ACTIVITY_LEVEL];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A badge definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub badge_type: String,
    /// Raw condition JSON; parsed on evaluation.
    pub condition: serde_json::Value,
    /// Minimum answers before the badge can be granted (`0` = no gate).
    pub required_answers: i64,
    /// Minimum adoption rate in percent, if any.
    pub required_adopt_rate: Option<f64>,
    pub bonus_points: i64,
    pub is_active: bool,
}

impl Badge {
    /// Whether holding this badge earns the adoption bonus.
    pub fn grants_adoption_bonus(&self) -> bool {
        ADOPTION_BONUS_BADGE_TYPES.contains(&self.badge_type.as_str())
    }
}

/// A badge held by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarnedBadge {
    #[serde(flatten)]
    pub badge: Badge,
    pub earned_at: Timestamp,
}

/// A `user_badges` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBadge {
    pub user_id: DbId,
    pub badge_id: DbId,
    pub earned_at: Timestamp,
}

/// Counters a badge condition can be evaluated against.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UserActivity {
    pub user_id: DbId,
    pub question_count: i64,
    pub answer_count: i64,
    pub adopted_count: i64,
    /// Sum of likes across the user's answers.
    pub likes_received: i64,
    /// Current balance.
    pub points: i64,
    /// Lifetime credits (sum of positive ledger amounts).
    pub points_earned: i64,
}

impl UserActivity {
    pub fn adopt_rate(&self) -> f64 {
        stats::adopt_rate(self.adopted_count, self.answer_count)
    }
}

/// Validate that a badge type string is one of the accepted values.
pub fn validate_badge_type(badge_type: &str) -> Result<(), String> {
    if VALID_BADGE_TYPES.contains(&badge_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid badge type '{badge_type}'. Must be one of: {}",
            VALID_BADGE_TYPES.join(", ")
        ))
    }
}
