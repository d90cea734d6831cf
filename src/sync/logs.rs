//! Log console synchronizer. Every poll re-fetches the whole log; there is
//! no tailing or line-level diffing.

use std::sync::Arc;
use std::time::Duration;

use super::poller::{PollHandle, apply_fetch, spawn_poller};
use super::snapshot::{Snapshot, SnapshotCell};
use crate::api::{ApiError, DashboardApi};

pub const RESOURCE: &str = "logs";
pub const DEFAULT_CADENCE: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct LogSync {
    api: Arc<dyn DashboardApi>,
    cell: SnapshotCell<Vec<String>>,
    cadence: Duration,
}

impl LogSync {
    #[must_use]
    pub fn new(api: Arc<dyn DashboardApi>, cadence: Duration) -> Self {
        Self { api, cell: SnapshotCell::new(Vec::new()), cadence }
    }

    #[must_use = "dropping the handle stops polling"]
    pub fn start(&self) -> PollHandle {
        let api = Arc::clone(&self.api);
        spawn_poller(RESOURCE, self.cadence, self.cell.clone(), move || {
            let api = Arc::clone(&api);
            async move { api.fetch_logs().await }
        })
    }

    /// Run a single fetch cycle outside the poll loop.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after it has been logged; the snapshot is kept.
    pub async fn poll_once(&self) -> Result<(), ApiError> {
        self.cell.begin_fetch();
        let result = self.api.fetch_logs().await;
        apply_fetch(RESOURCE, &self.cell, result)
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.cell.get()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<Vec<String>> {
        self.cell.snapshot()
    }
}

#[cfg(test)]
#[path = "logs_test.rs"]
mod tests;
