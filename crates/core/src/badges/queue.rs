//! Hand-off of post-adoption badge checks to a background worker.
//!
//! The adoption path only enqueues a user id; a worker owning the receiving
//! end runs [`BadgeEvaluator::check_and_award`](super::BadgeEvaluator::check_and_award)
//! for each one. Enqueueing never fails the caller: a full or closed queue
//! is logged and the check is dropped.

use tokio::sync::mpsc;

use crate::types::DbId;

/// Default number of pending checks held before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Sending half of the badge-check queue.
#[derive(Debug, Clone)]
pub struct BadgeCheckQueue {
    sender: mpsc::Sender<DbId>,
}

impl BadgeCheckQueue {
    /// Create a queue and the receiver the worker should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DbId>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue a badge check for `user_id`.
    ///
    /// Returns `false` if the check was dropped.
    pub fn enqueue(&self, user_id: DbId) -> bool {
        match self.sender.try_send(user_id) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(user_id, "Badge check queue full, dropping check");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(user_id, "Badge check worker stopped, dropping check");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueued_ids_reach_receiver() {
        let (queue, mut rx) = BadgeCheckQueue::channel(4);
        assert!(queue.enqueue(7));
        assert!(queue.enqueue(8));
        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(rx.recv().await, Some(8));
    }

    #[test]
    fn test_full_queue_drops_without_panicking() {
        let (queue, _rx) = BadgeCheckQueue::channel(1);
        assert!(queue.enqueue(1));
        assert!(!queue.enqueue(2));
    }

    #[test]
    fn test_closed_queue_drops_without_panicking() {
        let (queue, rx) = BadgeCheckQueue::channel(1);
        drop(rx);
        assert!(!queue.enqueue(1));
    }
}
