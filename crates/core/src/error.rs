use crate::store::StoreError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Question {0} not found")]
    QuestionNotFound(DbId),

    #[error("Answer {0} not found")]
    AnswerNotFound(DbId),

    #[error("User {0} not found")]
    UserNotFound(DbId),

    #[error("Only the question author may adopt or cancel an answer")]
    NotAuthorized,

    #[error("Answer {answer_id} does not belong to question {question_id}")]
    AnswerQuestionMismatch { question_id: DbId, answer_id: DbId },

    #[error("Answer {answer_id} was not written by user {claimed_author_id}")]
    AuthorMismatch {
        answer_id: DbId,
        claimed_author_id: DbId,
    },

    #[error("You cannot adopt your own answer")]
    SelfAdoptionForbidden,

    #[error("Question {0} has no adopted answer")]
    NoActiveAdoption(DbId),

    #[error("Insufficient points: balance {balance}, requested change {amount}")]
    InsufficientPoints { balance: i64, amount: i64 },

    #[error("Badge {badge_id} was already granted to user {user_id}")]
    DuplicateBadgeGrant { user_id: DbId, badge_id: DbId },

    #[error("Badge '{code}' has an invalid condition: {reason}")]
    BadgeCondition { code: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias used by the services in this crate.
pub type CoreResult<T> = Result<T, CoreError>;
