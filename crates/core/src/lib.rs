//! Domain core for the Jeju Q&A answer-adoption workflow.
//!
//! Services ([`adoption::AdoptionService`], [`points::PointLedger`],
//! [`badges::BadgeEvaluator`]) are plain values built once at startup around
//! an `Arc<dyn CommunityStore>`. This crate has no database dependency; the
//! PostgreSQL store lives in `jejuqa-db`.

pub mod adoption;
pub mod badges;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod notify;
pub mod points;
pub mod roles;
pub mod stats;
pub mod store;
pub mod types;
