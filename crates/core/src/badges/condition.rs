//! Declarative badge conditions.
//!
//! Stored in `badges.condition` as tagged JSON, e.g.
//!
//! ```json
//! { "type": "answer_count", "threshold": 10 }
//! { "type": "adopt_rate", "min_answers": 50, "min_rate": 30.0 }
//! { "type": "first_question" }
//! ```
//!
//! Each condition maps one counter of [`UserActivity`] to a threshold and
//! reports progress as a fraction in `[0, 1]`; it is satisfied at `1.0`.

use serde::{Deserialize, Serialize};

use super::{validate_badge_type, Badge, UserActivity};
use crate::error::{CoreError, CoreResult};

/// A parsed badge condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BadgeCondition {
    QuestionCount { threshold: i64 },
    AnswerCount { threshold: i64 },
    AdoptedCount { threshold: i64 },
    /// At least `min_answers` answers with an adoption rate of `min_rate`
    /// percent or more.
    AdoptRate { min_answers: i64, min_rate: f64 },
    LikeReceived { threshold: i64 },
    PointsEarned { threshold: i64 },
    FirstQuestion,
    FirstAnswer,
}

impl BadgeCondition {
    /// Parse and validate the condition stored on `badge`.
    ///
    /// A badge of an unknown type is rejected like a malformed condition.
    pub fn parse(badge: &Badge) -> CoreResult<Self> {
        validate_badge_type(&badge.badge_type).map_err(|reason| CoreError::BadgeCondition {
            code: badge.code.clone(),
            reason,
        })?;
        let condition: BadgeCondition = serde_json::from_value(badge.condition.clone())
            .map_err(|e| CoreError::BadgeCondition {
                code: badge.code.clone(),
                reason: e.to_string(),
            })?;
        condition.validate().map_err(|reason| CoreError::BadgeCondition {
            code: badge.code.clone(),
            reason,
        })?;
        Ok(condition)
    }

    /// Reject thresholds that could never be meaningfully reached.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::QuestionCount { threshold }
            | Self::AnswerCount { threshold }
            | Self::AdoptedCount { threshold }
            | Self::LikeReceived { threshold }
            | Self::PointsEarned { threshold } => {
                if threshold <= 0 {
                    return Err(format!("threshold must be positive, got {threshold}"));
                }
            }
            Self::AdoptRate {
                min_answers,
                min_rate,
            } => {
                if min_answers <= 0 {
                    return Err(format!("min_answers must be positive, got {min_answers}"));
                }
                if !(min_rate > 0.0 && min_rate <= 100.0) {
                    return Err(format!("min_rate must be in (0, 100], got {min_rate}"));
                }
            }
            Self::FirstQuestion | Self::FirstAnswer => {}
        }
        Ok(())
    }

    /// Progress towards the condition, clamped to `[0, 1]`.
    pub fn progress(&self, activity: &UserActivity) -> f64 {
        let raw = match *self {
            Self::QuestionCount { threshold } => ratio(activity.question_count, threshold),
            Self::AnswerCount { threshold } => ratio(activity.answer_count, threshold),
            Self::AdoptedCount { threshold } => ratio(activity.adopted_count, threshold),
            Self::LikeReceived { threshold } => ratio(activity.likes_received, threshold),
            Self::PointsEarned { threshold } => ratio(activity.points_earned, threshold),
            Self::AdoptRate {
                min_answers,
                min_rate,
            } => {
                let volume = ratio(activity.answer_count, min_answers);
                let rate = activity.adopt_rate() / min_rate;
                volume.min(rate)
            }
            Self::FirstQuestion => ratio(activity.question_count, 1),
            Self::FirstAnswer => ratio(activity.answer_count, 1),
        };
        raw.clamp(0.0, 1.0)
    }

    pub fn is_satisfied(&self, activity: &UserActivity) -> bool {
        self.progress(activity) >= 1.0
    }
}

fn ratio(value: i64, threshold: i64) -> f64 {
    if threshold <= 0 {
        return 1.0;
    }
    value as f64 / threshold as f64
}

/// Result of evaluating one badge against one user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BadgeEvaluation {
    /// Condition progress in `[0, 1]`.
    pub progress: f64,
    /// Condition satisfied and all badge-level gates passed.
    pub eligible: bool,
}

/// Evaluate a badge's condition and its `required_answers` /
/// `required_adopt_rate` gates.
pub fn evaluate(badge: &Badge, activity: &UserActivity) -> CoreResult<BadgeEvaluation> {
    let condition = BadgeCondition::parse(badge)?;
    let progress = condition.progress(activity);

    let answers_ok = activity.answer_count >= badge.required_answers;
    let rate_ok = badge
        .required_adopt_rate
        .map_or(true, |min| activity.adopt_rate() >= min);

    Ok(BadgeEvaluation {
        progress,
        eligible: progress >= 1.0 && answers_ok && rate_ok,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::badges::BADGE_TYPE_ACHIEVEMENT;

    fn badge(condition: serde_json::Value) -> Badge {
        Badge {
            id: 1,
            code: "test_badge".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            badge_type: BADGE_TYPE_ACHIEVEMENT.to_string(),
            condition,
            required_answers: 0,
            required_adopt_rate: None,
            bonus_points: 0,
            is_active: true,
        }
    }

    fn activity(answers: i64, adopted: i64) -> UserActivity {
        UserActivity {
            user_id: 1,
            answer_count: answers,
            adopted_count: adopted,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_count_condition() {
        let parsed =
            BadgeCondition::parse(&badge(json!({"type": "answer_count", "threshold": 10})))
                .unwrap();
        assert_eq!(parsed, BadgeCondition::AnswerCount { threshold: 10 });
    }

    #[test]
    fn test_parse_unit_condition() {
        let parsed = BadgeCondition::parse(&badge(json!({"type": "first_question"}))).unwrap();
        assert_eq!(parsed, BadgeCondition::FirstQuestion);
    }

    #[test]
    fn test_unknown_condition_type_rejected() {
        let result = BadgeCondition::parse(&badge(json!({"type": "moon_phase"})));
        assert_matches!(result, Err(CoreError::BadgeCondition { code, .. }) if code == "test_badge");
    }

    #[test]
    fn test_unknown_badge_type_rejected() {
        let mut legendary = badge(json!({"type": "first_answer"}));
        legendary.badge_type = "LEGENDARY".to_string();

        let result = BadgeCondition::parse(&legendary);
        assert_matches!(result, Err(CoreError::BadgeCondition { reason, .. }) if reason.contains("LEGENDARY"));
    }

    #[test]
    fn test_missing_threshold_rejected() {
        let result = BadgeCondition::parse(&badge(json!({"type": "answer_count"})));
        assert_matches!(result, Err(CoreError::BadgeCondition { .. }));
    }

    #[test]
    fn test_non_positive_threshold_rejected() {
        let result =
            BadgeCondition::parse(&badge(json!({"type": "like_received", "threshold": 0})));
        assert_matches!(result, Err(CoreError::BadgeCondition { reason, .. }) if reason.contains("positive"));
    }

    #[test]
    fn test_adopt_rate_out_of_range_rejected() {
        let condition = BadgeCondition::AdoptRate {
            min_answers: 10,
            min_rate: 120.0,
        };
        assert!(condition.validate().is_err());
    }

    #[test]
    fn test_count_progress_is_fractional_and_clamped() {
        let condition = BadgeCondition::AnswerCount { threshold: 10 };
        assert_eq!(condition.progress(&activity(4, 0)), 0.4);
        assert_eq!(condition.progress(&activity(25, 0)), 1.0);
        assert!(condition.is_satisfied(&activity(10, 0)));
        assert!(!condition.is_satisfied(&activity(9, 0)));
    }

    #[test]
    fn test_first_answer() {
        let condition = BadgeCondition::FirstAnswer;
        assert!(!condition.is_satisfied(&activity(0, 0)));
        assert!(condition.is_satisfied(&activity(1, 0)));
    }

    #[test]
    fn test_adopt_rate_needs_volume_and_rate() {
        let condition = BadgeCondition::AdoptRate {
            min_answers: 50,
            min_rate: 30.0,
        };
        // Enough volume, rate too low.
        assert!(!condition.is_satisfied(&activity(50, 10)));
        // Great rate, not enough volume.
        assert!(!condition.is_satisfied(&activity(10, 10)));
        // Both satisfied.
        assert!(condition.is_satisfied(&activity(50, 15)));
        // Progress reports the weaker dimension.
        assert_eq!(condition.progress(&activity(25, 25)), 0.5);
    }

    #[test]
    fn test_points_earned_uses_lifetime_credits() {
        let condition = BadgeCondition::PointsEarned { threshold: 100 };
        let spent_it_all = UserActivity {
            points: 0,
            points_earned: 150,
            ..Default::default()
        };
        assert!(condition.is_satisfied(&spent_it_all));
    }

    #[test]
    fn test_evaluate_applies_badge_gates() {
        let mut gated = badge(json!({"type": "adopted_count", "threshold": 2}));
        gated.required_answers = 5;
        gated.required_adopt_rate = Some(50.0);

        // Condition met, not enough answers.
        let result = evaluate(&gated, &activity(3, 2)).unwrap();
        assert_eq!(result.progress, 1.0);
        assert!(!result.eligible);

        // Enough answers, rate below the gate (2/6 = 33.33%).
        assert!(!evaluate(&gated, &activity(6, 2)).unwrap().eligible);

        // Both gates pass (3/6 = 50%).
        assert!(evaluate(&gated, &activity(6, 3)).unwrap().eligible);
    }
}
