//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Methods used inside service transactions take `&mut PgConnection` so they
//! run on a `sqlx::Transaction` as well as on a pooled connection.

pub mod answer_repo;
pub mod badge_repo;
pub mod notification_repo;
pub mod point_transaction_repo;
pub mod question_repo;
pub mod user_repo;

pub use answer_repo::AnswerRepo;
pub use badge_repo::BadgeRepo;
pub use notification_repo::NotificationRepo;
pub use point_transaction_repo::PointTransactionRepo;
pub use question_repo::QuestionRepo;
pub use user_repo::UserRepo;
