//! [`ActivityNotifier`] that publishes onto the [`EventBus`].

use std::sync::Arc;

use jejuqa_core::badges::Badge;
use jejuqa_core::notify::{ActivityNotifier, AdoptionNotice};
use jejuqa_core::points::{RELATED_ANSWER, RELATED_BADGE};
use jejuqa_core::types::DbId;
use serde_json::json;

use crate::bus::{EventBus, PlatformEvent, EVENT_ANSWER_ADOPTED, EVENT_BADGE_EARNED};

#[derive(Clone)]
pub struct EventBusNotifier {
    bus: Arc<EventBus>,
}

impl EventBusNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl ActivityNotifier for EventBusNotifier {
    fn badge_earned(&self, user_id: DbId, badge: &Badge) {
        self.bus.publish(
            PlatformEvent::new(EVENT_BADGE_EARNED)
                .with_source(RELATED_BADGE, badge.id)
                .with_recipient(user_id)
                .with_payload(json!({
                    "badge_code": badge.code,
                    "badge_name": badge.name,
                    "badge_type": badge.badge_type,
                    "bonus_points": badge.bonus_points,
                })),
        );
    }

    fn answer_adopted(&self, notice: &AdoptionNotice) {
        self.bus.publish(
            PlatformEvent::new(EVENT_ANSWER_ADOPTED)
                .with_source(RELATED_ANSWER, notice.answer_id)
                .with_actor(notice.adopter_id)
                .with_recipient(notice.answerer_id)
                .with_payload(json!({
                    "question_id": notice.question_id,
                    "points_awarded": notice.points_awarded,
                })),
        );
    }
}
