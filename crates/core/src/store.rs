//! Storage seam for the adoption, ledger and badge services.
//!
//! Services talk to storage exclusively through [`CommunityStore`], which
//! hands out [`StoreTx`] units of work. Every mutation happens inside a
//! transaction; a `StoreTx` that is dropped without [`StoreTx::commit`]
//! discards all of its writes.
//!
//! The PostgreSQL implementation lives in the `jejuqa-db` crate
//! (`PgStore`); [`crate::memory::InMemoryStore`] backs tests.

use async_trait::async_trait;
use serde::Serialize;

use crate::badges::{Badge, EarnedBadge, UserActivity, UserBadge};
use crate::points::{LedgerSummary, NewPointTransaction, PointTransaction};
use crate::stats::AnswerStats;
use crate::types::{DbId, Timestamp};

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The backend is unreachable or the statement failed.
    #[error("Storage error: {0}")]
    Backend(String),
}

/// The adoption-relevant projection of a question row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRecord {
    pub id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub accepted_answer_id: Option<DbId>,
}

/// The adoption-relevant projection of an answer row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRecord {
    pub id: DbId,
    pub question_id: DbId,
    pub author_id: DbId,
    pub like_count: i64,
    pub adopted_at: Option<Timestamp>,
}

/// A user with its denormalized point and answer aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: DbId,
    pub nickname: String,
    pub role: String,
    pub points: i64,
    pub total_answers: i64,
    pub adopted_answers: i64,
    pub adopt_rate: f64,
}

/// Total and adopted answer counts for one author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerCounts {
    pub total: i64,
    pub adopted: i64,
}

/// Entry point to a storage backend.
#[async_trait]
pub trait CommunityStore: Send + Sync {
    /// Open a new unit of work.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// A single transaction against the store.
#[async_trait]
pub trait StoreTx: Send {
    // -- questions ---------------------------------------------------------

    async fn find_question(&mut self, id: DbId) -> Result<Option<QuestionRecord>, StoreError>;

    /// Like [`find_question`](Self::find_question) but takes a row lock
    /// for the remainder of the transaction where the backend supports it.
    async fn lock_question(&mut self, id: DbId) -> Result<Option<QuestionRecord>, StoreError>;

    async fn set_accepted_answer(
        &mut self,
        question_id: DbId,
        answer_id: Option<DbId>,
    ) -> Result<(), StoreError>;

    // -- answers -----------------------------------------------------------

    async fn find_answer(&mut self, id: DbId) -> Result<Option<AnswerRecord>, StoreError>;

    async fn set_answer_adopted_at(
        &mut self,
        answer_id: DbId,
        adopted_at: Option<Timestamp>,
    ) -> Result<(), StoreError>;

    async fn count_answers_by_author(&mut self, author_id: DbId)
        -> Result<AnswerCounts, StoreError>;

    // -- users -------------------------------------------------------------

    async fn find_user(&mut self, id: DbId) -> Result<Option<UserRecord>, StoreError>;

    /// Read a user's point balance, locking the row against concurrent
    /// ledger writes. `None` if the user does not exist.
    async fn lock_user_points(&mut self, user_id: DbId) -> Result<Option<i64>, StoreError>;

    async fn set_user_points(&mut self, user_id: DbId, points: i64) -> Result<(), StoreError>;

    async fn update_answer_stats(
        &mut self,
        user_id: DbId,
        stats: &AnswerStats,
    ) -> Result<(), StoreError>;

    /// Aggregate activity counters used by badge conditions.
    async fn user_activity(&mut self, user_id: DbId) -> Result<Option<UserActivity>, StoreError>;

    // -- point ledger ------------------------------------------------------

    /// Append a ledger row whose `balance` snapshot is `balance`.
    async fn insert_point_transaction(
        &mut self,
        entry: &NewPointTransaction,
        balance: i64,
    ) -> Result<PointTransaction, StoreError>;

    async fn ledger_summary(&mut self, user_id: DbId) -> Result<LedgerSummary, StoreError>;

    /// Newest first.
    async fn list_point_transactions(
        &mut self,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointTransaction>, StoreError>;

    // -- badges ------------------------------------------------------------

    async fn list_active_badges(&mut self) -> Result<Vec<Badge>, StoreError>;

    async fn list_user_badges(&mut self, user_id: DbId) -> Result<Vec<EarnedBadge>, StoreError>;

    /// Record a badge grant. Returns `None` when the user already holds the
    /// badge; the existing grant is left untouched.
    async fn insert_user_badge(
        &mut self,
        user_id: DbId,
        badge_id: DbId,
    ) -> Result<Option<UserBadge>, StoreError>;

    // -- lifecycle ---------------------------------------------------------

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
