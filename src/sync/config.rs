//! Backend configuration synchronizer.
//!
//! DESIGN
//! ======
//! Fetched on demand only: views call [`ConfigSync::refresh`] when they
//! become active and nothing re-polls afterwards. `ConfigSync` is the shared
//! config context; it is cloned into every view that reads it, and clones
//! share one snapshot.

use std::sync::Arc;

use super::poller::apply_fetch;
use super::snapshot::{Snapshot, SnapshotCell};
use crate::api::{ApiError, ConfigEntry, DashboardApi};

pub const RESOURCE: &str = "config";

#[derive(Clone)]
pub struct ConfigSync {
    api: Arc<dyn DashboardApi>,
    cell: SnapshotCell<Vec<ConfigEntry>>,
}

impl ConfigSync {
    #[must_use]
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api, cell: SnapshotCell::new(Vec::new()) }
    }

    /// Fetch the backend config once and replace the held mapping.
    ///
    /// On failure the previous mapping is kept and the error is logged; no
    /// retry is scheduled.
    ///
    /// # Errors
    ///
    /// Returns the fetch error so one-shot callers can report it. Views
    /// ignore it and keep rendering the stale mapping.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.cell.begin_fetch();
        let result = self.api.fetch_config().await;
        apply_fetch(RESOURCE, &self.cell, result)
    }

    /// Entries in backend order.
    #[must_use]
    pub fn entries(&self) -> Vec<ConfigEntry> {
        self.cell.get()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<ConfigEntry> {
        self.cell.with(|entries| entries.iter().find(|e| e.key == key).cloned())
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<Vec<ConfigEntry>> {
        self.cell.snapshot()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
