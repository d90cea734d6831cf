//! Shared dashboard state.
//!
//! DESIGN
//! ======
//! `AppState` bundles one of each synchronizer and is injected into Axum
//! handlers via the `State` extractor. Every field is a cheap clone sharing
//! the same snapshot, so views read whatever the pollers last stored.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::api::{ConfigEntry, DashboardApi, Job, WorkflowStatus};
use crate::config::DashboardConfig;
use crate::sync::{
    ConfigSync, JobQueueSync, LogSync, PollHandle, SearchDispatcher, Snapshot, WorkflowStatusSync,
};

#[derive(Clone)]
pub struct AppState {
    pub config: ConfigSync,
    pub jobs: JobQueueSync,
    pub logs: LogSync,
    pub workflow: WorkflowStatusSync,
    pub search: SearchDispatcher,
    /// How often the page re-fetches its live fragment.
    pub page_refresh: Duration,
}

impl AppState {
    #[must_use]
    pub fn new(api: Arc<dyn DashboardApi>, settings: &DashboardConfig) -> Self {
        Self {
            config: ConfigSync::new(Arc::clone(&api)),
            jobs: JobQueueSync::new(Arc::clone(&api), settings.job_poll),
            logs: LogSync::new(Arc::clone(&api), settings.log_poll),
            workflow: WorkflowStatusSync::new(Arc::clone(&api), settings.job_poll),
            search: SearchDispatcher::new(api),
            page_refresh: settings.log_poll,
        }
    }

    /// Start every poller. Dropping the returned set stops them.
    #[must_use = "dropping the pollers stops them"]
    pub fn start_pollers(&self) -> Pollers {
        Pollers { handles: vec![self.jobs.start(), self.logs.start(), self.workflow.start()] }
    }

    /// Current snapshots of every resource.
    #[must_use]
    pub fn dashboard(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            config: self.config.snapshot(),
            jobs: self.jobs.snapshot(),
            logs: self.logs.snapshot(),
            workflow: self.workflow.snapshot(),
        }
    }
}

/// The running pollers of one dashboard.
#[derive(Debug)]
pub struct Pollers {
    handles: Vec<PollHandle>,
}

impl Pollers {
    /// Stop every poller and wait for each to exit.
    pub async fn stop(self) {
        for handle in self.handles {
            handle.stop().await;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub config: Snapshot<Vec<ConfigEntry>>,
    pub jobs: Snapshot<Vec<Job>>,
    pub logs: Snapshot<Vec<String>>,
    pub workflow: Snapshot<WorkflowStatus>,
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
