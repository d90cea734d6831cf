//! Workflow status synchronizer for `/api/job_status`, polled on the job cadence.

use std::sync::Arc;
use std::time::Duration;

use super::poller::{PollHandle, apply_fetch, spawn_poller};
use super::snapshot::{Snapshot, SnapshotCell};
use crate::api::{ApiError, DashboardApi, WorkflowStatus};

pub const RESOURCE: &str = "job_status";

#[derive(Clone)]
pub struct WorkflowStatusSync {
    api: Arc<dyn DashboardApi>,
    cell: SnapshotCell<WorkflowStatus>,
    cadence: Duration,
}

impl WorkflowStatusSync {
    #[must_use]
    pub fn new(api: Arc<dyn DashboardApi>, cadence: Duration) -> Self {
        Self { api, cell: SnapshotCell::new(WorkflowStatus::default()), cadence }
    }

    #[must_use = "dropping the handle stops polling"]
    pub fn start(&self) -> PollHandle {
        let api = Arc::clone(&self.api);
        spawn_poller(RESOURCE, self.cadence, self.cell.clone(), move || {
            let api = Arc::clone(&api);
            async move { api.fetch_workflow_status().await }
        })
    }

    /// Run a single fetch cycle outside the poll loop.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after it has been logged; the snapshot is kept.
    pub async fn poll_once(&self) -> Result<(), ApiError> {
        self.cell.begin_fetch();
        let result = self.api.fetch_workflow_status().await;
        apply_fetch(RESOURCE, &self.cell, result)
    }

    #[must_use]
    pub fn status(&self) -> WorkflowStatus {
        self.cell.get()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<WorkflowStatus> {
        self.cell.snapshot()
    }
}

#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;
