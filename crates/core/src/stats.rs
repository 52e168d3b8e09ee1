//! Answer statistics recomputed from ground truth.
//!
//! `users.total_answers`, `users.adopted_answers` and `users.adopt_rate` are
//! denormalized. They are always rebuilt from count queries on `answers`
//! rather than incremented, so a missed update never accumulates drift.

use serde::Serialize;

/// Answer counters for a single user, as stored on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnswerStats {
    pub total_answers: i64,
    pub adopted_answers: i64,
    pub adopt_rate: f64,
}

impl AnswerStats {
    /// Build stats from raw counts, deriving the adoption rate.
    pub fn from_counts(total_answers: i64, adopted_answers: i64) -> Self {
        Self {
            total_answers,
            adopted_answers,
            adopt_rate: adopt_rate(adopted_answers, total_answers),
        }
    }
}

/// Percentage of adopted answers, rounded to two decimal places.
///
/// Returns `0.0` when the user has no answers.
pub fn adopt_rate(adopted_answers: i64, total_answers: i64) -> f64 {
    if total_answers <= 0 {
        return 0.0;
    }
    let pct = adopted_answers as f64 / total_answers as f64 * 100.0;
    round2(pct)
}

/// Round to two decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_answers_yields_zero_rate() {
        assert_eq!(adopt_rate(0, 0), 0.0);
    }

    #[test]
    fn test_all_adopted_is_hundred() {
        assert_eq!(adopt_rate(1, 1), 100.0);
        assert_eq!(adopt_rate(7, 7), 100.0);
    }

    #[test]
    fn test_rate_rounds_to_two_decimals() {
        assert_eq!(adopt_rate(1, 3), 33.33);
        assert_eq!(adopt_rate(2, 3), 66.67);
        assert_eq!(adopt_rate(1, 7), 14.29);
    }

    #[test]
    fn test_from_counts_derives_rate() {
        let stats = AnswerStats::from_counts(4, 1);
        assert_eq!(stats.total_answers, 4);
        assert_eq!(stats.adopted_answers, 1);
        assert_eq!(stats.adopt_rate, 25.0);
    }
}
