//! Fixed-interval completion polling.
//!
//! While a job is pending, the loop fetches the server copy once per tick
//! and hands it to the session for reconciliation, stopping as soon as
//! the result URL appears or the token is cancelled. Fetch errors are
//! logged and retried on the next tick; they are deliberately kept out of
//! the notice stream so routine retries do not flood the user.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use thumbsmith_core::types::JobId;

use crate::service::ThumbnailService;
use crate::session::JobShared;

/// Tunable parameters for the completion poll.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between fetches.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Poll a pending job until it completes or the token is cancelled.
///
/// Cancellation is honored at every tick boundary. A fetch that is in
/// flight at the moment of cancellation is allowed to finish, but its
/// response is discarded — the liveness check runs again after the await.
pub(crate) async fn run_poll_loop<S: ThumbnailService + 'static>(
    service: Arc<S>,
    id: JobId,
    shared: Arc<RwLock<JobShared>>,
    cancel: CancellationToken,
    config: PollConfig,
) {
    tracing::debug!(
        job_id = %id,
        interval_ms = config.interval.as_millis() as u64,
        "Completion poll started",
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(job_id = %id, "Completion poll cancelled");
                return;
            }
            _ = tokio::time::sleep(config.interval) => {}
        }

        match service.fetch(&id).await {
            Ok(record) => {
                // The session may have been torn down while the fetch was
                // in flight; a late response must not be applied.
                if cancel.is_cancelled() {
                    return;
                }
                let complete = {
                    let mut guard = shared.write().await;
                    guard.observe_server_copy(record)
                };
                if complete {
                    tracing::info!(job_id = %id, "Generation complete, polling stopped");
                    return;
                }
            }
            Err(e) => {
                // Transient failures are retried on the next tick.
                tracing::warn!(job_id = %id, error = %e, "Completion poll failed");
            }
        }
    }
}
