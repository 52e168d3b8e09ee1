//! Background tasks.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. A task stops on its own once its input
//! closes; its [`CancellationToken`] is the hard stop used by [`drain`]
//! when that takes longer than the shutdown grace period.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod badge_checks;

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wait up to `grace` for a background task to finish its queued work,
/// then cancel it and wait for it to exit.
///
/// The caller must have dropped every sender feeding the task first,
/// otherwise the task only ever stops through `cancel`.
pub async fn drain(
    name: &str,
    mut handle: JoinHandle<()>,
    cancel: &CancellationToken,
    grace: Duration,
) {
    match tokio::time::timeout(grace, &mut handle).await {
        Ok(Ok(())) => tracing::info!(task = name, "Background task drained"),
        Ok(Err(e)) => tracing::error!(task = name, error = %e, "Background task failed"),
        Err(_) => {
            tracing::warn!(
                task = name,
                grace_secs = grace.as_secs_f64(),
                "Background task did not drain in time, cancelling"
            );
            cancel.cancel();
            if let Err(e) = handle.await {
                tracing::error!(task = name, error = %e, "Background task failed");
            }
        }
    }
}
