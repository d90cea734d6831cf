//! Job queue synchronizer.

use std::sync::Arc;
use std::time::Duration;

use super::poller::{PollHandle, apply_fetch, spawn_poller};
use super::snapshot::{Snapshot, SnapshotCell};
use crate::api::{ApiError, DashboardApi, Job};

pub const RESOURCE: &str = "job_queue";
pub const DEFAULT_CADENCE: Duration = Duration::from_secs(5);

/// Keeps the backend job queue mirrored locally, in backend order.
#[derive(Clone)]
pub struct JobQueueSync {
    api: Arc<dyn DashboardApi>,
    cell: SnapshotCell<Vec<Job>>,
    cadence: Duration,
}

impl JobQueueSync {
    #[must_use]
    pub fn new(api: Arc<dyn DashboardApi>, cadence: Duration) -> Self {
        Self { api, cell: SnapshotCell::new(Vec::new()), cadence }
    }

    /// Start polling. Fetches immediately, then every cadence until the
    /// handle is stopped or dropped.
    #[must_use = "dropping the handle stops polling"]
    pub fn start(&self) -> PollHandle {
        let api = Arc::clone(&self.api);
        spawn_poller(RESOURCE, self.cadence, self.cell.clone(), move || {
            let api = Arc::clone(&api);
            async move { api.fetch_jobs().await }
        })
    }

    /// Run a single fetch cycle outside the poll loop.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after it has been logged; the snapshot is kept.
    pub async fn poll_once(&self) -> Result<(), ApiError> {
        self.cell.begin_fetch();
        let result = self.api.fetch_jobs().await;
        apply_fetch(RESOURCE, &self.cell, result)
    }

    #[must_use]
    pub fn jobs(&self) -> Vec<Job> {
        self.cell.get()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<Vec<Job>> {
        self.cell.snapshot()
    }

    #[must_use]
    pub fn cadence(&self) -> Duration {
        self.cadence
    }
}

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;
