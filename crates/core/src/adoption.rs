//! Answer adoption: the question author selects one answer as accepted.
//!
//! Adopting toggles the adoption state, credits the answerer through the
//! point ledger and refreshes the answerer's statistics, all in one
//! transaction. A badge check for the answerer is queued once the
//! transaction commits.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::badges::BadgeCheckQueue;
use crate::error::{CoreError, CoreResult};
use crate::notify::{ActivityNotifier, AdoptionNotice, NoopNotifier};
use crate::points::{NewPointTransaction, PointLedger, RELATED_ANSWER, TX_ANSWER_ACCEPTED};
use crate::stats::AnswerStats;
use crate::store::{CommunityStore, StoreTx};
use crate::types::{DbId, Timestamp};

/// Default credit for an adopted answer.
pub const DEFAULT_BASE_POINTS: i64 = 50;
/// Default extra credit when the answerer holds an expert or activity badge.
pub const DEFAULT_BADGE_BONUS: i64 = 25;

/// Point amounts paid on adoption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdoptionPolicy {
    pub base_points: i64,
    pub badge_bonus: i64,
}

impl Default for AdoptionPolicy {
    fn default() -> Self {
        Self {
            base_points: DEFAULT_BASE_POINTS,
            badge_bonus: DEFAULT_BADGE_BONUS,
        }
    }
}

impl AdoptionPolicy {
    /// Every adoption must credit something; the bonus may be zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_points <= 0 {
            return Err(format!(
                "base_points must be positive, got {}",
                self.base_points
            ));
        }
        if self.badge_bonus < 0 {
            return Err(format!(
                "badge_bonus must not be negative, got {}",
                self.badge_bonus
            ));
        }
        Ok(())
    }
}

/// Request to adopt an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AdoptAnswer {
    pub question_id: DbId,
    pub answer_id: DbId,
    pub adopter_id: DbId,
    pub answerer_id: DbId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdoptionResult {
    pub success: bool,
    pub adopted_answer_id: DbId,
    /// Everything credited for this adoption, bonus included.
    pub expert_points_awarded: i64,
    /// Answerer's balance after the credit.
    pub total_points: i64,
    /// The badge-bonus portion of the credit, when non-zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_points_awarded: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelResult {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdoptionStatus {
    pub is_adopted: bool,
    pub adopted_answer_id: Option<DbId>,
    pub adopted_at: Option<Timestamp>,
    pub answerer_name: Option<String>,
}

/// Coordinates adoption, cancellation and status lookups.
#[derive(Clone)]
pub struct AdoptionService {
    store: Arc<dyn CommunityStore>,
    policy: AdoptionPolicy,
    queue: Option<BadgeCheckQueue>,
    notifier: Arc<dyn ActivityNotifier>,
}

impl AdoptionService {
    pub fn new(store: Arc<dyn CommunityStore>) -> Self {
        Self {
            store,
            policy: AdoptionPolicy::default(),
            queue: None,
            notifier: Arc::new(NoopNotifier),
        }
    }

    pub fn with_policy(mut self, policy: AdoptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Queue that receives the answerer's id after each adoption.
    pub fn with_badge_queue(mut self, queue: BadgeCheckQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ActivityNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn policy(&self) -> AdoptionPolicy {
        self.policy
    }

    /// Adopt `request.answer_id` on behalf of the question author.
    ///
    /// Any previously adopted answer on the question is un-adopted first.
    /// Adopting the same answer again pays again.
    pub async fn adopt(&self, request: AdoptAnswer) -> CoreResult<AdoptionResult> {
        let AdoptAnswer {
            question_id,
            answer_id,
            adopter_id,
            answerer_id,
        } = request;

        if adopter_id == answerer_id {
            return Err(CoreError::SelfAdoptionForbidden);
        }

        let mut tx = self.store.begin().await?;

        let question = tx
            .lock_question(question_id)
            .await?
            .ok_or(CoreError::QuestionNotFound(question_id))?;
        if question.author_id != adopter_id {
            return Err(CoreError::NotAuthorized);
        }
        let answer = tx
            .find_answer(answer_id)
            .await?
            .ok_or(CoreError::AnswerNotFound(answer_id))?;
        if answer.question_id != question_id {
            return Err(CoreError::AnswerQuestionMismatch {
                question_id,
                answer_id,
            });
        }
        if answer.author_id != answerer_id {
            return Err(CoreError::AuthorMismatch {
                answer_id,
                claimed_author_id: answerer_id,
            });
        }

        // Un-adopt the previous answer, remembering its author for stats.
        let mut previous_author = None;
        if let Some(previous_id) = question.accepted_answer_id {
            if let Some(previous) = tx.find_answer(previous_id).await? {
                tx.set_answer_adopted_at(previous_id, None).await?;
                previous_author = Some(previous.author_id);
            }
        }

        tx.set_answer_adopted_at(answer_id, Some(Utc::now())).await?;
        tx.set_accepted_answer(question_id, Some(answer_id)).await?;

        let has_badge = tx
            .list_user_badges(answerer_id)
            .await?
            .iter()
            .any(|earned| earned.badge.grants_adoption_bonus());
        let badge_bonus = if has_badge { self.policy.badge_bonus } else { 0 };
        let award = self.policy.base_points + badge_bonus;

        let entry = NewPointTransaction::new(
            answerer_id,
            award,
            TX_ANSWER_ACCEPTED,
            format!("Answer adopted: {}", question.title),
        )
        .with_related(RELATED_ANSWER, answer_id)
        .with_metadata(serde_json::json!({
            "basePoints": self.policy.base_points,
            "badgeBonus": badge_bonus,
            "hasBadge": has_badge,
        }));
        let record = PointLedger::add_points_in(tx.as_mut(), &entry).await?;

        refresh_answer_stats(tx.as_mut(), answerer_id).await?;
        if let Some(previous_author) = previous_author.filter(|id| *id != answerer_id) {
            refresh_answer_stats(tx.as_mut(), previous_author).await?;
        }

        tx.commit().await?;

        tracing::info!(
            question_id,
            answer_id,
            adopter_id,
            answerer_id,
            points = award,
            has_badge,
            "Answer adopted"
        );

        if let Some(queue) = &self.queue {
            queue.enqueue(answerer_id);
        }
        self.notifier.answer_adopted(&AdoptionNotice {
            question_id,
            answer_id,
            adopter_id,
            answerer_id,
            points_awarded: award,
        });

        Ok(AdoptionResult {
            success: true,
            adopted_answer_id: answer_id,
            expert_points_awarded: award,
            total_points: record.balance,
            badge_points_awarded: (badge_bonus > 0).then_some(badge_bonus),
        })
    }

    /// Withdraw the current adoption. Points already paid are kept.
    pub async fn cancel(&self, question_id: DbId, user_id: DbId) -> CoreResult<CancelResult> {
        let mut tx = self.store.begin().await?;

        let question = tx
            .lock_question(question_id)
            .await?
            .ok_or(CoreError::QuestionNotFound(question_id))?;
        if question.author_id != user_id {
            return Err(CoreError::NotAuthorized);
        }
        let adopted_id = question
            .accepted_answer_id
            .ok_or(CoreError::NoActiveAdoption(question_id))?;

        let former_author = tx.find_answer(adopted_id).await?.map(|a| a.author_id);
        if former_author.is_some() {
            tx.set_answer_adopted_at(adopted_id, None).await?;
        }
        tx.set_accepted_answer(question_id, None).await?;
        if let Some(author_id) = former_author {
            refresh_answer_stats(tx.as_mut(), author_id).await?;
        }

        tx.commit().await?;

        tracing::info!(question_id, answer_id = adopted_id, "Adoption cancelled");

        Ok(CancelResult {
            success: true,
            message: "Adoption cancelled".to_string(),
        })
    }

    /// Current adoption state of a question.
    pub async fn status(&self, question_id: DbId) -> CoreResult<AdoptionStatus> {
        let mut tx = self.store.begin().await?;

        let question = tx
            .find_question(question_id)
            .await?
            .ok_or(CoreError::QuestionNotFound(question_id))?;

        let Some(answer_id) = question.accepted_answer_id else {
            tx.commit().await?;
            return Ok(AdoptionStatus {
                is_adopted: false,
                adopted_answer_id: None,
                adopted_at: None,
                answerer_name: None,
            });
        };

        let answer = tx.find_answer(answer_id).await?;
        let answerer_name = match &answer {
            Some(a) => tx.find_user(a.author_id).await?.map(|u| u.nickname),
            None => None,
        };
        tx.commit().await?;

        Ok(AdoptionStatus {
            is_adopted: true,
            adopted_answer_id: Some(answer_id),
            adopted_at: answer.and_then(|a| a.adopted_at),
            answerer_name,
        })
    }
}

/// Recount a user's answers and persist the derived statistics.
pub async fn refresh_answer_stats(tx: &mut dyn StoreTx, user_id: DbId) -> CoreResult<AnswerStats> {
    let counts = tx.count_answers_by_author(user_id).await?;
    let stats = AnswerStats::from_counts(counts.total, counts.adopted);
    tx.update_answer_stats(user_id, &stats).await?;
    Ok(stats)
}
