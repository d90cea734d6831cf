//! Shared polling primitive for the job, log and workflow synchronizers.
//!
//! DESIGN
//! ======
//! A poller is one tokio task: fetch immediately, then fetch again at every
//! `start + n * cadence`. The returned [`PollHandle`] is the only way to
//! stop it; stopping (or dropping the handle) cancels the scheduled fetch and
//! abandons an in-flight one so its result is never applied. Results that
//! race a drop on another worker are refused by the stopped cell.
//!
//! Cadences below [`MIN_CADENCE`] are raised to it so the schedule always
//! moves forward.
//!
//! OVERLAP
//! =======
//! Fetches run one at a time. Schedule points that pass while a fetch is in
//! flight are skipped, not queued; the next fetch happens at the first
//! schedule point after the slow one returns.
//!
//! ERROR HANDLING
//! ==============
//! No failure stops the loop. Failed cycles keep the previous snapshot and
//! log a warning. There is no backoff and no retry cap.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::snapshot::{PollPhase, SnapshotCell};
use crate::api::ApiError;

/// Smallest cadence a poller runs at.
pub const MIN_CADENCE: Duration = Duration::from_millis(1);

/// Apply one fetch result to a cell: replace on success, keep and log on failure.
///
/// Returns the error back so one-shot callers can report it.
pub(crate) fn apply_fetch<T>(
    resource: &'static str,
    cell: &SnapshotCell<T>,
    result: Result<T, ApiError>,
) -> Result<(), ApiError> {
    match result {
        Ok(data) => {
            if cell.replace(data) {
                debug!(resource, "snapshot replaced");
            } else {
                debug!(resource, "poller stopped; discarding fetch result");
            }
            Ok(())
        }
        Err(e) => {
            if cell.record_failure(&e) {
                warn!(resource, error = %e, code = e.error_code(), "fetch failed; keeping previous snapshot");
            }
            Err(e)
        }
    }
}

/// Spawn a poller that feeds `cell` from `fetch` every `cadence`.
pub fn spawn_poller<T, F, Fut>(
    resource: &'static str,
    cadence: Duration,
    cell: SnapshotCell<T>,
    fetch: F,
) -> PollHandle
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    if cadence < MIN_CADENCE {
        warn!(resource, ?cadence, "cadence below minimum; raising it");
    }
    let cadence = cadence.max(MIN_CADENCE);
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let task_cell = cell.clone();

    let task = tokio::spawn(async move {
        let cell = task_cell;
        let cadence_ms = u64::try_from(cadence.as_millis()).unwrap_or(u64::MAX);
        info!(resource, cadence_ms, "poller started");

        let mut next = Instant::now();
        loop {
            if stop_signalled(&stop_rx) {
                break;
            }
            cell.begin_fetch();
            let result = tokio::select! {
                biased;
                () = stop_requested(&mut stop_rx) => break,
                result = fetch() => result,
            };
            let _ = apply_fetch(resource, &cell, result);

            next += cadence;
            let now = Instant::now();
            let mut skipped = 0_u64;
            while next < now {
                next += cadence;
                skipped += 1;
            }
            if skipped > 0 {
                debug!(resource, skipped, "fetch outlasted cadence; skipping missed ticks");
                cell.record_skipped(skipped);
            }

            tokio::select! {
                biased;
                () = stop_requested(&mut stop_rx) => break,
                () = tokio::time::sleep_until(next) => {}
            }
        }

        cell.set_phase(PollPhase::Stopped);
        info!(resource, "poller stopped");
    });

    PollHandle {
        resource,
        stop_tx,
        task: Some(task),
        on_drop: Box::new(move || cell.set_phase(PollPhase::Stopped)),
    }
}

/// Resolves once a stop has been signalled or the handle is gone.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

fn stop_signalled(rx: &watch::Receiver<bool>) -> bool {
    *rx.borrow() || rx.has_changed().is_err()
}

// =============================================================================
// HANDLE
// =============================================================================

/// Handle to a running poller. Dropping it cancels the poller.
pub struct PollHandle {
    resource: &'static str,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    on_drop: Box<dyn Fn() + Send + Sync>,
}

impl PollHandle {
    #[must_use]
    pub fn resource(&self) -> &'static str {
        self.resource
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the poller and wait for its task to exit.
    ///
    /// Once this returns no further fetch is started and the result of any
    /// fetch that was in flight has been discarded.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(resource = self.resource, error = %e, "poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.stop_tx.send(true);
            task.abort();
            (self.on_drop)();
        }
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("resource", &self.resource)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod tests;
