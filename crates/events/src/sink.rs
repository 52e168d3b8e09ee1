//! Notification delivery.
//!
//! [`NotificationSink`] subscribes to the bus and turns badge and adoption
//! events into `notifications` rows for their recipient. Events without a
//! recipient, or of other types, are ignored.

use jejuqa_core::types::DbId;
use jejuqa_db::models::notification::CreateNotification;
use jejuqa_db::repositories::NotificationRepo;
use jejuqa_db::DbPool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::{PlatformEvent, EVENT_ANSWER_ADOPTED, EVENT_BADGE_EARNED};

pub struct NotificationSink;

impl NotificationSink {
    /// Run the delivery loop until the bus closes or `cancel` fires.
    ///
    /// Events still buffered when the last sender drops are delivered
    /// before the loop sees the bus close.
    pub async fn run(
        pool: DbPool,
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        tracing::info!("Notification sink started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification sink stopping");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        let Some(notification) = render(&event) else {
                            continue;
                        };
                        if let Err(e) = NotificationRepo::create(&pool, &notification).await {
                            tracing::error!(
                                error = %e,
                                event_type = %event.event_type,
                                user_id = notification.user_id,
                                "Failed to store notification"
                            );
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Notification sink lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, notification sink shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// Build the notification for `event`, if it warrants one.
pub fn render(event: &PlatformEvent) -> Option<CreateNotification> {
    let user_id: DbId = event.recipient_user_id?;
    let payload = &event.payload;

    let (title, message) = match event.event_type.as_str() {
        EVENT_BADGE_EARNED => {
            let name = payload["badge_name"].as_str().unwrap_or("새 배지");
            let bonus = payload["bonus_points"].as_i64().unwrap_or(0);
            let message = if bonus > 0 {
                format!("'{name}' 배지를 획득했어요! 보너스 {bonus}포인트가 지급되었습니다.")
            } else {
                format!("'{name}' 배지를 획득했어요!")
            };
            ("새 배지 획득".to_string(), message)
        }
        EVENT_ANSWER_ADOPTED => {
            let points = payload["points_awarded"].as_i64().unwrap_or(0);
            (
                "답변이 채택되었어요".to_string(),
                format!("회원님의 답변이 채택되어 {points}포인트를 받았습니다."),
            )
        }
        _ => return None,
    };

    Some(CreateNotification {
        user_id,
        notification_type: event.event_type.clone(),
        title,
        message,
        related_type: event.source_entity_type.clone(),
        related_id: event.source_entity_id,
    })
}
