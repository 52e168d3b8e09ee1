//! Outbound notification seam.
//!
//! The adoption and badge services report noteworthy outcomes through an
//! [`ActivityNotifier`]. Implementations must not block; the event crate's
//! implementation publishes onto an in-process bus and returns.

use serde::Serialize;

use crate::badges::Badge;
use crate::types::DbId;

/// Summary of a committed adoption, for notification fan-out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdoptionNotice {
    pub question_id: DbId,
    pub answer_id: DbId,
    pub adopter_id: DbId,
    pub answerer_id: DbId,
    pub points_awarded: i64,
}

/// Receives adoption and badge outcomes after they are committed.
pub trait ActivityNotifier: Send + Sync {
    fn badge_earned(&self, user_id: DbId, badge: &Badge);

    fn answer_adopted(&self, notice: &AdoptionNotice);
}

/// Notifier that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ActivityNotifier for NoopNotifier {
    fn badge_earned(&self, _user_id: DbId, _badge: &Badge) {}

    fn answer_adopted(&self, _notice: &AdoptionNotice) {}
}
