//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Shared as `Arc<EventBus>`. Publishing never blocks and never fails; with
//! no subscribers the event is dropped.

use chrono::{DateTime, Utc};
use jejuqa_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A user earned a badge.
pub const EVENT_BADGE_EARNED: &str = "badge.earned";
/// A question author adopted an answer.
pub const EVENT_ANSWER_ADOPTED: &str = "answer.adopted";

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event.
///
/// Built with [`PlatformEvent::new`] and the `with_*` methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"badge.earned"`.
    pub event_type: String,

    /// Kind of the entity the event is about (`"badge"`, `"answer"`).
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,

    /// User whose action caused the event.
    pub actor_user_id: Option<DbId>,

    /// User the event should be delivered to.
    pub recipient_user_id: Option<DbId>,

    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            recipient_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_recipient(mut self, user_id: DbId) -> Self {
        self.recipient_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use jejuqa_events::bus::{EventBus, PlatformEvent, EVENT_BADGE_EARNED};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new(EVENT_BADGE_EARNED).with_recipient(7));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer wraps.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: PlatformEvent) {
        // A send error only means there are no receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_enriched_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::new(EVENT_ANSWER_ADOPTED)
                .with_source("answer", 42)
                .with_actor(7)
                .with_recipient(9)
                .with_payload(serde_json::json!({"points": 50})),
        );

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, EVENT_ANSWER_ADOPTED);
        assert_eq!(received.source_entity_type.as_deref(), Some("answer"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.recipient_user_id, Some(9));
        assert_eq!(received.payload["points"], 50);
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(PlatformEvent::new(EVENT_BADGE_EARNED));

        assert_eq!(first.recv().await.unwrap().event_type, EVENT_BADGE_EARNED);
        assert_eq!(second.recv().await.unwrap().event_type, EVENT_BADGE_EARNED);
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        EventBus::new(0).publish(PlatformEvent::new("nobody.listens"));
    }
}
