//! Badge eligibility evaluation and granting.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::condition::evaluate;
use super::{Badge, EarnedBadge, UserActivity};
use crate::error::{CoreError, CoreResult};
use crate::notify::ActivityNotifier;
use crate::points::{NewPointTransaction, PointLedger, RELATED_BADGE, TX_BADGE_EARNED};
use crate::store::CommunityStore;
use crate::types::DbId;

/// Progress of one user towards one badge they do not yet hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeProgress {
    pub badge_id: DbId,
    pub code: String,
    pub name: String,
    pub badge_type: String,
    pub progress: f64,
    pub eligible: bool,
}

/// Badges granted to one user during a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserGrants {
    pub user_id: DbId,
    pub badge_codes: Vec<String>,
}

/// A user whose evaluation failed during a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserFailure {
    pub user_id: DbId,
    pub error: String,
}

/// Outcome of [`BadgeEvaluator::check_many`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchEvaluation {
    pub evaluated: usize,
    pub granted: Vec<UserGrants>,
    pub failures: Vec<UserFailure>,
}

/// Evaluates badge conditions and grants badges.
#[derive(Clone)]
pub struct BadgeEvaluator {
    store: Arc<dyn CommunityStore>,
    notifier: Arc<dyn ActivityNotifier>,
}

impl BadgeEvaluator {
    pub fn new(store: Arc<dyn CommunityStore>, notifier: Arc<dyn ActivityNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Grant every active badge the user newly qualifies for.
    ///
    /// Returns the badges granted by this call. A badge whose condition
    /// cannot be parsed, or whose grant fails, is logged and skipped; the
    /// remaining badges are still evaluated. Fails only if the user's
    /// activity cannot be loaded.
    pub async fn check_and_award(&self, user_id: DbId) -> CoreResult<Vec<Badge>> {
        let (mut activity, held, candidates) = self.load(user_id).await?;

        let mut granted = Vec::new();
        for badge in candidates.into_iter().filter(|b| !held.contains(&b.id)) {
            let evaluation = match evaluate(&badge, &activity) {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    tracing::warn!(
                        user_id,
                        badge_code = %badge.code,
                        error = %e,
                        "Skipping badge with invalid condition"
                    );
                    continue;
                }
            };
            if !evaluation.eligible {
                continue;
            }

            match self.grant(user_id, &badge).await {
                Ok(()) => {
                    tracing::info!(
                        user_id,
                        badge_code = %badge.code,
                        bonus_points = badge.bonus_points,
                        "Badge granted"
                    );
                    if badge.bonus_points > 0 {
                        activity.points += badge.bonus_points;
                        activity.points_earned += badge.bonus_points;
                    }
                    self.notifier.badge_earned(user_id, &badge);
                    granted.push(badge);
                }
                Err(CoreError::DuplicateBadgeGrant { .. }) => {
                    tracing::debug!(
                        user_id,
                        badge_code = %badge.code,
                        "Badge already granted concurrently"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        user_id,
                        badge_code = %badge.code,
                        error = %e,
                        "Failed to grant badge"
                    );
                }
            }
        }

        Ok(granted)
    }

    /// Run [`check_and_award`](Self::check_and_award) for each user.
    ///
    /// Users are evaluated independently; one user's failure is recorded
    /// and the batch continues.
    pub async fn check_many(&self, user_ids: &[DbId]) -> BatchEvaluation {
        let mut result = BatchEvaluation::default();

        for &user_id in user_ids {
            result.evaluated += 1;
            match self.check_and_award(user_id).await {
                Ok(badges) if badges.is_empty() => {}
                Ok(badges) => result.granted.push(UserGrants {
                    user_id,
                    badge_codes: badges.into_iter().map(|b| b.code).collect(),
                }),
                Err(e) => {
                    tracing::error!(user_id, error = %e, "Badge evaluation failed for user");
                    result.failures.push(UserFailure {
                        user_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            evaluated = result.evaluated,
            users_with_grants = result.granted.len(),
            failures = result.failures.len(),
            "Batch badge evaluation finished"
        );
        result
    }

    /// Progress towards every active badge the user does not hold.
    ///
    /// Badges with invalid conditions are omitted.
    pub async fn progress(&self, user_id: DbId) -> CoreResult<Vec<BadgeProgress>> {
        let (activity, held, candidates) = self.load(user_id).await?;

        Ok(candidates
            .into_iter()
            .filter(|b| !held.contains(&b.id))
            .filter_map(|badge| {
                let evaluation = evaluate(&badge, &activity).ok()?;
                Some(BadgeProgress {
                    badge_id: badge.id,
                    code: badge.code,
                    name: badge.name,
                    badge_type: badge.badge_type,
                    progress: evaluation.progress,
                    eligible: evaluation.eligible,
                })
            })
            .collect())
    }

    /// Badges the user holds, with grant times.
    pub async fn user_badges(&self, user_id: DbId) -> CoreResult<Vec<EarnedBadge>> {
        let mut tx = self.store.begin().await?;
        if tx.find_user(user_id).await?.is_none() {
            return Err(CoreError::UserNotFound(user_id));
        }
        let badges = tx.list_user_badges(user_id).await?;
        tx.commit().await?;
        Ok(badges)
    }

    async fn load(&self, user_id: DbId) -> CoreResult<(UserActivity, HashSet<DbId>, Vec<Badge>)> {
        let mut tx = self.store.begin().await?;
        let activity = tx
            .user_activity(user_id)
            .await?
            .ok_or(CoreError::UserNotFound(user_id))?;
        let held: HashSet<DbId> = tx
            .list_user_badges(user_id)
            .await?
            .into_iter()
            .map(|earned| earned.badge.id)
            .collect();
        let candidates = tx.list_active_badges().await?;
        tx.commit().await?;
        Ok((activity, held, candidates))
    }

    /// Record the grant and pay the bonus in one transaction.
    async fn grant(&self, user_id: DbId, badge: &Badge) -> CoreResult<()> {
        let mut tx = self.store.begin().await?;

        if tx.insert_user_badge(user_id, badge.id).await?.is_none() {
            return Err(CoreError::DuplicateBadgeGrant {
                user_id,
                badge_id: badge.id,
            });
        }

        if badge.bonus_points > 0 {
            let entry = NewPointTransaction::new(
                user_id,
                badge.bonus_points,
                TX_BADGE_EARNED,
                format!("Badge earned: {}", badge.name),
            )
            .with_related(RELATED_BADGE, badge.id)
            .with_metadata(serde_json::json!({
                "badgeCode": badge.code,
                "bonusPoints": badge.bonus_points,
            }));
            PointLedger::add_points_in(tx.as_mut(), &entry).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::badges::{BADGE_TYPE_ACHIEVEMENT, BADGE_TYPE_ACTIVITY_LEVEL};
    use crate::memory::{InMemoryStore, NewBadge};
    use crate::notify::AdoptionNotice;
    use crate::roles::ROLE_MEMBER;

    #[derive(Default)]
    struct RecordingNotifier {
        badges: Mutex<Vec<(DbId, String)>>,
    }

    impl ActivityNotifier for RecordingNotifier {
        fn badge_earned(&self, user_id: DbId, badge: &Badge) {
            self.badges
                .lock()
                .unwrap()
                .push((user_id, badge.code.clone()));
        }

        fn answer_adopted(&self, _notice: &AdoptionNotice) {}
    }

    fn evaluator(store: &InMemoryStore, notifier: Arc<RecordingNotifier>) -> BadgeEvaluator {
        BadgeEvaluator::new(Arc::new(store.clone()), notifier)
    }

    fn new_badge(code: &str, condition: serde_json::Value, bonus_points: i64) -> NewBadge {
        NewBadge {
            code: code.to_string(),
            name: code.to_string(),
            badge_type: BADGE_TYPE_ACHIEVEMENT.to_string(),
            condition,
            required_answers: 0,
            required_adopt_rate: None,
            bonus_points,
            is_active: true,
        }
    }

    /// A user with one question asked and `answers` answers on it.
    async fn active_user(store: &InMemoryStore, answers: usize) -> DbId {
        let asker = store.insert_user("asker", ROLE_MEMBER).await;
        let user = store.insert_user("answerer", ROLE_MEMBER).await;
        store.insert_question(user, "Where to eat?").await;
        let other = store.insert_question(asker, "Best beach?").await;
        for _ in 0..answers {
            store.insert_answer(other, user).await;
        }
        user
    }

    #[tokio::test]
    async fn test_grants_satisfied_badges_with_bonus() {
        let store = InMemoryStore::new();
        let user = active_user(&store, 1).await;
        store
            .insert_badge(new_badge("first_answer", json!({"type": "first_answer"}), 10))
            .await;
        store
            .insert_badge(new_badge(
                "ten_answers",
                json!({"type": "answer_count", "threshold": 10}),
                100,
            ))
            .await;

        let notifier = Arc::new(RecordingNotifier::default());
        let granted = evaluator(&store, Arc::clone(&notifier))
            .check_and_award(user)
            .await
            .unwrap();

        assert_eq!(granted.len(), 1);
        assert_eq!(granted[0].code, "first_answer");

        let user_row = store.user(user).await.unwrap();
        assert_eq!(user_row.points, 10);
        let txs = store.transactions_for(user).await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].transaction_type, TX_BADGE_EARNED);
        assert_eq!(txs[0].related_type.as_deref(), Some(RELATED_BADGE));
        assert_eq!(txs[0].balance, 10);

        assert_eq!(
            notifier.badges.lock().unwrap().as_slice(),
            &[(user, "first_answer".to_string())]
        );
    }

    #[tokio::test]
    async fn test_second_check_grants_nothing_new() {
        let store = InMemoryStore::new();
        let user = active_user(&store, 1).await;
        store
            .insert_badge(new_badge("first_answer", json!({"type": "first_answer"}), 10))
            .await;
        let evaluator = evaluator(&store, Arc::new(RecordingNotifier::default()));

        assert_eq!(evaluator.check_and_award(user).await.unwrap().len(), 1);
        assert!(evaluator.check_and_award(user).await.unwrap().is_empty());
        assert_eq!(store.user(user).await.unwrap().points, 10);
    }

    #[tokio::test]
    async fn test_malformed_condition_does_not_abort_scan() {
        let store = InMemoryStore::new();
        let user = active_user(&store, 2).await;
        store
            .insert_badge(new_badge("broken", json!({"type": "answer_count"}), 0))
            .await;
        store
            .insert_badge(new_badge("first_question", json!({"type": "first_question"}), 0))
            .await;

        let granted = evaluator(&store, Arc::new(RecordingNotifier::default()))
            .check_and_award(user)
            .await
            .unwrap();

        let codes: Vec<_> = granted.iter().map(|b| b.code.as_str()).collect();
        assert_eq!(codes, vec!["first_question"]);
    }

    #[tokio::test]
    async fn test_inactive_badges_are_ignored() {
        let store = InMemoryStore::new();
        let user = active_user(&store, 1).await;
        let mut retired = new_badge("retired", json!({"type": "first_answer"}), 5);
        retired.is_active = false;
        store.insert_badge(retired).await;

        let granted = evaluator(&store, Arc::new(RecordingNotifier::default()))
            .check_and_award(user)
            .await
            .unwrap();
        assert!(granted.is_empty());
    }

    #[tokio::test]
    async fn test_bonus_can_unlock_points_badge_in_same_pass() {
        let store = InMemoryStore::new();
        let user = active_user(&store, 1).await;
        store
            .insert_badge(new_badge("first_answer", json!({"type": "first_answer"}), 100))
            .await;
        store
            .insert_badge(new_badge(
                "hundred_points",
                json!({"type": "points_earned", "threshold": 100}),
                0,
            ))
            .await;

        let granted = evaluator(&store, Arc::new(RecordingNotifier::default()))
            .check_and_award(user)
            .await
            .unwrap();
        assert_eq!(granted.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_fails() {
        let store = InMemoryStore::new();
        let result = evaluator(&store, Arc::new(RecordingNotifier::default()))
            .check_and_award(999)
            .await;
        assert_matches!(result, Err(CoreError::UserNotFound(999)));
    }

    #[tokio::test]
    async fn test_batch_isolates_user_failures() {
        let store = InMemoryStore::new();
        let first = active_user(&store, 1).await;
        let second = active_user(&store, 1).await;
        store
            .insert_badge(new_badge("first_answer", json!({"type": "first_answer"}), 0))
            .await;

        let result = evaluator(&store, Arc::new(RecordingNotifier::default()))
            .check_many(&[first, 4242, second])
            .await;

        assert_eq!(result.evaluated, 3);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].user_id, 4242);
        let users: Vec<_> = result.granted.iter().map(|g| g.user_id).collect();
        assert_eq!(users, vec![first, second]);
    }

    #[tokio::test]
    async fn test_progress_lists_unheld_badges() {
        let store = InMemoryStore::new();
        let user = active_user(&store, 3).await;
        let held = store
            .insert_badge(new_badge("first_answer", json!({"type": "first_answer"}), 0))
            .await;
        store.grant_badge(user, held).await;
        let mut level = new_badge("ten_answers", json!({"type": "answer_count", "threshold": 10}), 0);
        level.badge_type = BADGE_TYPE_ACTIVITY_LEVEL.to_string();
        store.insert_badge(level).await;
        store
            .insert_badge(new_badge("broken", json!({"type": "nope"}), 0))
            .await;

        let progress = evaluator(&store, Arc::new(RecordingNotifier::default()))
            .progress(user)
            .await
            .unwrap();

        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].code, "ten_answers");
        assert_eq!(progress[0].badge_type, BADGE_TYPE_ACTIVITY_LEVEL);
        assert!((progress[0].progress - 0.3).abs() < 1e-9);
        assert!(!progress[0].eligible);
    }
}
