//! [`CommunityStore`] backed by PostgreSQL.
//!
//! Each [`StoreTx`] wraps one `sqlx::Transaction`. Dropping it without
//! commit rolls the transaction back.

use async_trait::async_trait;
use jejuqa_core::badges::{Badge, EarnedBadge, UserActivity, UserBadge};
use jejuqa_core::points::{LedgerSummary, NewPointTransaction, PointTransaction};
use jejuqa_core::stats::AnswerStats;
use jejuqa_core::store::{
    AnswerCounts, AnswerRecord, CommunityStore, QuestionRecord, StoreError, StoreTx, UserRecord,
};
use jejuqa_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::repositories::{
    AnswerRepo, BadgeRepo, PointTransactionRepo, QuestionRepo, UserRepo,
};

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error onto the storage error the core understands.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StoreError::UniqueViolation(constraint);
        }
    }
    StoreError::Backend(err.to_string())
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CommunityStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(store_error)?;
        Ok(Box::new(PgStoreTx { tx }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}

pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    // -- questions ---------------------------------------------------------

    async fn find_question(&mut self, id: DbId) -> Result<Option<QuestionRecord>, StoreError> {
        let row = QuestionRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn lock_question(&mut self, id: DbId) -> Result<Option<QuestionRecord>, StoreError> {
        let row = QuestionRepo::find_for_update(&mut self.tx, id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn set_accepted_answer(
        &mut self,
        question_id: DbId,
        answer_id: Option<DbId>,
    ) -> Result<(), StoreError> {
        QuestionRepo::set_accepted_answer(&mut self.tx, question_id, answer_id)
            .await
            .map_err(store_error)
    }

    // -- answers -----------------------------------------------------------

    async fn find_answer(&mut self, id: DbId) -> Result<Option<AnswerRecord>, StoreError> {
        let row = AnswerRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn set_answer_adopted_at(
        &mut self,
        answer_id: DbId,
        adopted_at: Option<Timestamp>,
    ) -> Result<(), StoreError> {
        AnswerRepo::set_adopted_at(&mut self.tx, answer_id, adopted_at)
            .await
            .map_err(store_error)
    }

    async fn count_answers_by_author(
        &mut self,
        author_id: DbId,
    ) -> Result<AnswerCounts, StoreError> {
        let (total, adopted) = AnswerRepo::count_by_author(&mut self.tx, author_id)
            .await
            .map_err(store_error)?;
        Ok(AnswerCounts { total, adopted })
    }

    // -- users -------------------------------------------------------------

    async fn find_user(&mut self, id: DbId) -> Result<Option<UserRecord>, StoreError> {
        let row = UserRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn lock_user_points(&mut self, user_id: DbId) -> Result<Option<i64>, StoreError> {
        UserRepo::lock_points(&mut self.tx, user_id)
            .await
            .map_err(store_error)
    }

    async fn set_user_points(&mut self, user_id: DbId, points: i64) -> Result<(), StoreError> {
        UserRepo::set_points(&mut self.tx, user_id, points)
            .await
            .map_err(store_error)
    }

    async fn update_answer_stats(
        &mut self,
        user_id: DbId,
        stats: &AnswerStats,
    ) -> Result<(), StoreError> {
        UserRepo::update_answer_stats(&mut self.tx, user_id, stats)
            .await
            .map_err(store_error)
    }

    async fn user_activity(&mut self, user_id: DbId) -> Result<Option<UserActivity>, StoreError> {
        let row = UserRepo::activity(&mut self.tx, user_id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    // -- point ledger ------------------------------------------------------

    async fn insert_point_transaction(
        &mut self,
        entry: &NewPointTransaction,
        balance: i64,
    ) -> Result<PointTransaction, StoreError> {
        let row = PointTransactionRepo::insert(&mut self.tx, entry, balance)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }

    async fn ledger_summary(&mut self, user_id: DbId) -> Result<LedgerSummary, StoreError> {
        let (total_amount, transaction_count) = PointTransactionRepo::summary(&mut self.tx, user_id)
            .await
            .map_err(store_error)?;
        Ok(LedgerSummary {
            total_amount,
            transaction_count,
        })
    }

    async fn list_point_transactions(
        &mut self,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointTransaction>, StoreError> {
        let rows = PointTransactionRepo::list_for_user(&mut self.tx, user_id, limit, offset)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // -- badges ------------------------------------------------------------

    async fn list_active_badges(&mut self) -> Result<Vec<Badge>, StoreError> {
        let rows = BadgeRepo::list_active(&mut self.tx)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_user_badges(&mut self, user_id: DbId) -> Result<Vec<EarnedBadge>, StoreError> {
        let rows = BadgeRepo::list_for_user(&mut self.tx, user_id)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_user_badge(
        &mut self,
        user_id: DbId,
        badge_id: DbId,
    ) -> Result<Option<UserBadge>, StoreError> {
        let row = BadgeRepo::grant(&mut self.tx, user_id, badge_id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    // -- lifecycle ---------------------------------------------------------

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_error)
    }
}
