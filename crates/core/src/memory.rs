//! In-process [`CommunityStore`] used by unit and API tests.
//!
//! Transactions are serialized: [`InMemoryStore::begin`] takes an exclusive
//! lock on the whole dataset and works on a private copy, which replaces the
//! shared state only on commit. Dropping the transaction discards the copy.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::badges::{Badge, EarnedBadge, UserActivity, UserBadge};
use crate::points::{LedgerSummary, NewPointTransaction, PointTransaction};
use crate::stats::AnswerStats;
use crate::store::{
    AnswerCounts, AnswerRecord, CommunityStore, QuestionRecord, StoreError, StoreTx, UserRecord,
};
use crate::types::{DbId, Timestamp};

/// Input for [`InMemoryStore::insert_badge`].
#[derive(Debug, Clone)]
pub struct NewBadge {
    pub code: String,
    pub name: String,
    pub badge_type: String,
    pub condition: serde_json::Value,
    pub required_answers: i64,
    pub required_adopt_rate: Option<f64>,
    pub bonus_points: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
struct Dataset {
    next_id: DbId,
    users: BTreeMap<DbId, UserRecord>,
    questions: BTreeMap<DbId, QuestionRecord>,
    answers: BTreeMap<DbId, AnswerRecord>,
    badges: BTreeMap<DbId, Badge>,
    user_badges: Vec<UserBadge>,
    transactions: Vec<PointTransaction>,
}

impl Dataset {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`CommunityStore`] holding everything in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<Mutex<Dataset>>,
    offline: Arc<std::sync::atomic::AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Backend`].
    pub fn set_offline(&self, offline: bool) {
        self.offline
            .store(offline, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Backend("store is offline".to_string()));
        }
        Ok(())
    }

    // ---- seeding ----

    pub async fn insert_user(&self, nickname: &str, role: &str) -> DbId {
        let mut data = self.data.lock().await;
        let id = data.allocate_id();
        data.users.insert(
            id,
            UserRecord {
                id,
                nickname: nickname.to_string(),
                role: role.to_string(),
                points: 0,
                total_answers: 0,
                adopted_answers: 0,
                adopt_rate: 0.0,
            },
        );
        id
    }

    pub async fn insert_question(&self, author_id: DbId, title: &str) -> DbId {
        let mut data = self.data.lock().await;
        let id = data.allocate_id();
        data.questions.insert(
            id,
            QuestionRecord {
                id,
                author_id,
                title: title.to_string(),
                accepted_answer_id: None,
            },
        );
        id
    }

    pub async fn insert_answer(&self, question_id: DbId, author_id: DbId) -> DbId {
        let mut data = self.data.lock().await;
        let id = data.allocate_id();
        data.answers.insert(
            id,
            AnswerRecord {
                id,
                question_id,
                author_id,
                like_count: 0,
                adopted_at: None,
            },
        );
        id
    }

    pub async fn set_like_count(&self, answer_id: DbId, like_count: i64) {
        if let Some(answer) = self.data.lock().await.answers.get_mut(&answer_id) {
            answer.like_count = like_count;
        }
    }

    pub async fn insert_badge(&self, badge: NewBadge) -> DbId {
        let mut data = self.data.lock().await;
        let id = data.allocate_id();
        data.badges.insert(
            id,
            Badge {
                id,
                code: badge.code,
                name: badge.name,
                description: String::new(),
                badge_type: badge.badge_type,
                condition: badge.condition,
                required_answers: badge.required_answers,
                required_adopt_rate: badge.required_adopt_rate,
                bonus_points: badge.bonus_points,
                is_active: badge.is_active,
            },
        );
        id
    }

    /// Record a grant directly, without paying any bonus.
    pub async fn grant_badge(&self, user_id: DbId, badge_id: DbId) {
        self.data.lock().await.user_badges.push(UserBadge {
            user_id,
            badge_id,
            earned_at: Utc::now(),
        });
    }

    /// Set `users.points` without writing a ledger row.
    pub async fn overwrite_points(&self, user_id: DbId, points: i64) {
        if let Some(user) = self.data.lock().await.users.get_mut(&user_id) {
            user.points = points;
        }
    }

    // ---- inspection ----

    pub async fn user(&self, id: DbId) -> Option<UserRecord> {
        self.data.lock().await.users.get(&id).cloned()
    }

    pub async fn question(&self, id: DbId) -> Option<QuestionRecord> {
        self.data.lock().await.questions.get(&id).cloned()
    }

    pub async fn answer(&self, id: DbId) -> Option<AnswerRecord> {
        self.data.lock().await.answers.get(&id).cloned()
    }

    /// Ledger rows for a user, oldest first.
    pub async fn transactions_for(&self, user_id: DbId) -> Vec<PointTransaction> {
        self.data
            .lock()
            .await
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn badge_codes_for(&self, user_id: DbId) -> Vec<String> {
        let data = self.data.lock().await;
        data.user_badges
            .iter()
            .filter(|ub| ub.user_id == user_id)
            .filter_map(|ub| data.badges.get(&ub.badge_id).map(|b| b.code.clone()))
            .collect()
    }
}

#[async_trait]
impl CommunityStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        self.check_online()?;
        let guard = Arc::clone(&self.data).lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(InMemoryTx { guard, work }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}

struct InMemoryTx {
    guard: OwnedMutexGuard<Dataset>,
    work: Dataset,
}

impl InMemoryTx {
    fn user_mut(&mut self, user_id: DbId) -> Result<&mut UserRecord, StoreError> {
        self.work
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::Backend(format!("user {user_id} does not exist")))
    }
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn find_question(&mut self, id: DbId) -> Result<Option<QuestionRecord>, StoreError> {
        Ok(self.work.questions.get(&id).cloned())
    }

    async fn lock_question(&mut self, id: DbId) -> Result<Option<QuestionRecord>, StoreError> {
        self.find_question(id).await
    }

    async fn set_accepted_answer(
        &mut self,
        question_id: DbId,
        answer_id: Option<DbId>,
    ) -> Result<(), StoreError> {
        let question = self
            .work
            .questions
            .get_mut(&question_id)
            .ok_or_else(|| StoreError::Backend(format!("question {question_id} does not exist")))?;
        question.accepted_answer_id = answer_id;
        Ok(())
    }

    async fn find_answer(&mut self, id: DbId) -> Result<Option<AnswerRecord>, StoreError> {
        Ok(self.work.answers.get(&id).cloned())
    }

    async fn set_answer_adopted_at(
        &mut self,
        answer_id: DbId,
        adopted_at: Option<Timestamp>,
    ) -> Result<(), StoreError> {
        let answer = self
            .work
            .answers
            .get_mut(&answer_id)
            .ok_or_else(|| StoreError::Backend(format!("answer {answer_id} does not exist")))?;
        answer.adopted_at = adopted_at;
        Ok(())
    }

    async fn count_answers_by_author(
        &mut self,
        author_id: DbId,
    ) -> Result<AnswerCounts, StoreError> {
        let mine = self.work.answers.values().filter(|a| a.author_id == author_id);
        let (total, adopted) = mine.fold((0, 0), |(total, adopted), a| {
            (total + 1, adopted + i64::from(a.adopted_at.is_some()))
        });
        Ok(AnswerCounts { total, adopted })
    }

    async fn find_user(&mut self, id: DbId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn lock_user_points(&mut self, user_id: DbId) -> Result<Option<i64>, StoreError> {
        Ok(self.work.users.get(&user_id).map(|u| u.points))
    }

    async fn set_user_points(&mut self, user_id: DbId, points: i64) -> Result<(), StoreError> {
        self.user_mut(user_id)?.points = points;
        Ok(())
    }

    async fn update_answer_stats(
        &mut self,
        user_id: DbId,
        stats: &AnswerStats,
    ) -> Result<(), StoreError> {
        let user = self.user_mut(user_id)?;
        user.total_answers = stats.total_answers;
        user.adopted_answers = stats.adopted_answers;
        user.adopt_rate = stats.adopt_rate;
        Ok(())
    }

    async fn user_activity(&mut self, user_id: DbId) -> Result<Option<UserActivity>, StoreError> {
        let Some(user) = self.work.users.get(&user_id) else {
            return Ok(None);
        };

        let question_count = self
            .work
            .questions
            .values()
            .filter(|q| q.author_id == user_id)
            .count() as i64;
        let answers: Vec<&AnswerRecord> = self
            .work
            .answers
            .values()
            .filter(|a| a.author_id == user_id)
            .collect();
        let points_earned = self
            .work
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id && t.amount > 0)
            .map(|t| t.amount)
            .sum();

        Ok(Some(UserActivity {
            user_id,
            question_count,
            answer_count: answers.len() as i64,
            adopted_count: answers.iter().filter(|a| a.adopted_at.is_some()).count() as i64,
            likes_received: answers.iter().map(|a| a.like_count).sum(),
            points: user.points,
            points_earned,
        }))
    }

    async fn insert_point_transaction(
        &mut self,
        entry: &NewPointTransaction,
        balance: i64,
    ) -> Result<PointTransaction, StoreError> {
        let record = PointTransaction {
            id: self.work.allocate_id(),
            user_id: entry.user_id,
            amount: entry.amount,
            balance,
            transaction_type: entry.transaction_type.clone(),
            description: entry.description.clone(),
            related_type: entry.related_type.clone(),
            related_id: entry.related_id,
            metadata: entry.metadata.clone(),
            created_at: Utc::now(),
        };
        self.work.transactions.push(record.clone());
        Ok(record)
    }

    async fn ledger_summary(&mut self, user_id: DbId) -> Result<LedgerSummary, StoreError> {
        Ok(self
            .work
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .fold(LedgerSummary::default(), |acc, t| LedgerSummary {
                total_amount: acc.total_amount + t.amount,
                transaction_count: acc.transaction_count + 1,
            }))
    }

    async fn list_point_transactions(
        &mut self,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointTransaction>, StoreError> {
        Ok(self
            .work
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_active_badges(&mut self) -> Result<Vec<Badge>, StoreError> {
        Ok(self
            .work
            .badges
            .values()
            .filter(|b| b.is_active)
            .cloned()
            .collect())
    }

    async fn list_user_badges(&mut self, user_id: DbId) -> Result<Vec<EarnedBadge>, StoreError> {
        Ok(self
            .work
            .user_badges
            .iter()
            .filter(|ub| ub.user_id == user_id)
            .filter_map(|ub| {
                self.work.badges.get(&ub.badge_id).map(|badge| EarnedBadge {
                    badge: badge.clone(),
                    earned_at: ub.earned_at,
                })
            })
            .collect())
    }

    async fn insert_user_badge(
        &mut self,
        user_id: DbId,
        badge_id: DbId,
    ) -> Result<Option<UserBadge>, StoreError> {
        let held = self
            .work
            .user_badges
            .iter()
            .any(|ub| ub.user_id == user_id && ub.badge_id == badge_id);
        if held {
            return Ok(None);
        }
        let grant = UserBadge {
            user_id,
            badge_id,
            earned_at: Utc::now(),
        };
        self.work.user_badges.push(grant.clone());
        Ok(Some(grant))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTx { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}
