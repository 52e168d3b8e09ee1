//! Community event bus and notification delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope published for badge grants and
//!   adoptions.
//! - [`EventBusNotifier`]: the core [`ActivityNotifier`](jejuqa_core::notify::ActivityNotifier)
//!   that publishes onto the bus.
//! - [`NotificationSink`]: background subscriber writing user-facing
//!   notifications to the `notifications` table.

pub mod bus;
pub mod notifier;
pub mod sink;

pub use bus::{EventBus, PlatformEvent, EVENT_ANSWER_ADOPTED, EVENT_BADGE_EARNED};
pub use notifier::EventBusNotifier;
pub use sink::NotificationSink;
