//! Post-adoption badge evaluation.
//!
//! Adoption enqueues the answerer's id on a [`BadgeCheckQueue`] after its
//! transaction commits; this worker drains the queue and runs the
//! evaluator. A failed check is logged and never reaches the adoption that
//! triggered it.
//!
//! On shutdown the queue closes once the router drops its senders, and the
//! worker finishes every check already queued before it returns.
//!
//! [`BadgeCheckQueue`]: jejuqa_core::badges::BadgeCheckQueue

use jejuqa_core::badges::BadgeEvaluator;
use jejuqa_core::types::DbId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Run the badge check loop until the queue closes and is empty, or until
/// `cancel` fires.
pub async fn run(
    evaluator: BadgeEvaluator,
    mut receiver: mpsc::Receiver<DbId>,
    cancel: CancellationToken,
) {
    tracing::info!("Badge check worker started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let dropped = receiver.len();
                if dropped > 0 {
                    tracing::warn!(dropped, "Badge check worker cancelled with checks still queued");
                } else {
                    tracing::info!("Badge check worker stopping");
                }
                break;
            }
            next = receiver.recv() => {
                let Some(user_id) = next else {
                    tracing::info!("Badge check queue closed, worker shutting down");
                    break;
                };
                match evaluator.check_and_award(user_id).await {
                    Ok(granted) if !granted.is_empty() => {
                        tracing::debug!(user_id, granted = granted.len(), "Badge check granted badges");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(user_id, error = %e, "Badge check failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use jejuqa_core::badges::{BadgeCheckQueue, BADGE_TYPE_ACHIEVEMENT};
    use jejuqa_core::memory::{InMemoryStore, NewBadge};
    use jejuqa_core::notify::NoopNotifier;
    use jejuqa_core::roles::ROLE_MEMBER;
    use serde_json::json;

    use super::*;

    fn first_answer_badge() -> NewBadge {
        NewBadge {
            code: "first_answer".to_string(),
            name: "첫 답변".to_string(),
            badge_type: BADGE_TYPE_ACHIEVEMENT.to_string(),
            condition: json!({"type": "first_answer"}),
            required_answers: 0,
            required_adopt_rate: None,
            bonus_points: 10,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn drains_queue_and_grants() {
        let store = InMemoryStore::new();
        store.insert_badge(first_answer_badge()).await;
        let asker = store.insert_user("asker", ROLE_MEMBER).await;
        let answerer = store.insert_user("answerer", ROLE_MEMBER).await;
        let question = store.insert_question(asker, "Bus to Udo?").await;
        store.insert_answer(question, answerer).await;

        let evaluator = BadgeEvaluator::new(Arc::new(store.clone()), Arc::new(NoopNotifier));
        let (queue, receiver) = BadgeCheckQueue::channel(8);
        assert!(queue.enqueue(answerer));
        drop(queue);

        run(evaluator, receiver, CancellationToken::new()).await;

        assert_eq!(store.badge_codes_for(answerer).await, vec!["first_answer"]);
        assert_eq!(store.user(answerer).await.unwrap().points, 10);
    }

    #[tokio::test]
    async fn unknown_user_does_not_stop_worker() {
        let store = InMemoryStore::new();
        store.insert_badge(first_answer_badge()).await;
        let asker = store.insert_user("asker", ROLE_MEMBER).await;
        let answerer = store.insert_user("answerer", ROLE_MEMBER).await;
        let question = store.insert_question(asker, "Hallasan trail?").await;
        store.insert_answer(question, answerer).await;

        let evaluator = BadgeEvaluator::new(Arc::new(store.clone()), Arc::new(NoopNotifier));
        let (queue, receiver) = BadgeCheckQueue::channel(8);
        queue.enqueue(9999);
        queue.enqueue(answerer);
        drop(queue);

        run(evaluator, receiver, CancellationToken::new()).await;

        assert_eq!(store.badge_codes_for(answerer).await, vec!["first_answer"]);
    }

    #[tokio::test]
    async fn shutdown_finishes_queued_checks_without_cancelling() {
        let store = InMemoryStore::new();
        store.insert_badge(first_answer_badge()).await;
        let asker = store.insert_user("asker", ROLE_MEMBER).await;
        let answerer = store.insert_user("answerer", ROLE_MEMBER).await;
        let question = store.insert_question(asker, "Olle route 7?").await;
        store.insert_answer(question, answerer).await;

        let evaluator = BadgeEvaluator::new(Arc::new(store.clone()), Arc::new(NoopNotifier));
        let (queue, receiver) = BadgeCheckQueue::channel(8);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(evaluator, receiver, cancel.clone()));

        assert!(queue.enqueue(answerer));
        drop(queue);
        crate::background::drain("badge checks", handle, &cancel, Duration::from_secs(5)).await;

        assert!(!cancel.is_cancelled());
        assert_eq!(store.badge_codes_for(answerer).await, vec!["first_answer"]);
    }

    #[tokio::test]
    async fn stops_on_cancel() {
        let store = InMemoryStore::new();
        let evaluator = BadgeEvaluator::new(Arc::new(store), Arc::new(NoopNotifier));
        let (_queue, receiver) = BadgeCheckQueue::channel(8);
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Returns even though the sender is still alive.
        run(evaluator, receiver, cancel).await;
    }
}
