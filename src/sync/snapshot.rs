//! Snapshot cells: the state each synchronizer owns.
//!
//! DESIGN
//! ======
//! A cell holds the latest successfully fetched value plus diagnostic
//! metadata. Success replaces the value wholesale; failure only touches the
//! metadata. Nothing is held across an await, so a std `RwLock` is enough.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::api::ApiError;

/// Lifecycle position of a synchronizer.
///
/// `Idle → Polling → (Succeeded | Failed) → Polling → … → Stopped`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollPhase {
    #[default]
    Idle,
    Polling,
    Succeeded,
    Failed,
    Stopped,
}

/// Last failure seen by a synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub code: &'static str,
    pub message: String,
    pub at_ms: i64,
}

/// Diagnostics kept alongside a snapshot. Never affects the held value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncMeta {
    pub phase: PollPhase,
    /// Fetches started.
    pub fetches: u64,
    pub successes: u64,
    pub failures: u64,
    /// Schedule ticks dropped because a fetch was still in flight.
    pub skipped_ticks: u64,
    /// Bumped on every successful replacement.
    pub version: u64,
    pub last_success_ms: Option<i64>,
    pub last_error: Option<SyncFailure>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot<T> {
    pub data: T,
    pub meta: SyncMeta,
}

/// Shared handle to one resource's snapshot. Clones see the same state.
#[derive(Debug, Default)]
pub struct SnapshotCell<T> {
    inner: Arc<RwLock<Snapshot<T>>>,
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> SnapshotCell<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self { inner: Arc::new(RwLock::new(Snapshot { data: initial, meta: SyncMeta::default() })) }
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn meta(&self) -> SyncMeta {
        self.read().meta.clone()
    }

    #[must_use]
    pub fn phase(&self) -> PollPhase {
        self.read().meta.phase
    }

    /// Borrow the held value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read().data)
    }

    pub fn set_phase(&self, phase: PollPhase) {
        self.write().meta.phase = phase;
    }

    /// Mark the start of a fetch.
    pub fn begin_fetch(&self) {
        let mut guard = self.write();
        guard.meta.phase = PollPhase::Polling;
        guard.meta.fetches += 1;
    }

    /// Replace the held value with a freshly fetched one.
    ///
    /// A stopped cell ignores the result and returns `false`; only the next
    /// [`begin_fetch`](Self::begin_fetch) reopens it.
    pub fn replace(&self, data: T) -> bool {
        let mut guard = self.write();
        if guard.meta.phase == PollPhase::Stopped {
            return false;
        }
        guard.data = data;
        guard.meta.phase = PollPhase::Succeeded;
        guard.meta.successes += 1;
        guard.meta.version += 1;
        guard.meta.last_success_ms = Some(now_ms());
        true
    }

    /// Record a failed fetch. The held value is left untouched.
    ///
    /// Ignored on a stopped cell, like [`replace`](Self::replace).
    pub fn record_failure(&self, err: &ApiError) -> bool {
        let mut guard = self.write();
        if guard.meta.phase == PollPhase::Stopped {
            return false;
        }
        guard.meta.phase = PollPhase::Failed;
        guard.meta.failures += 1;
        guard.meta.last_error =
            Some(SyncFailure { code: err.error_code(), message: err.to_string(), at_ms: now_ms() });
        true
    }

    pub fn record_skipped(&self, ticks: u64) {
        self.write().meta.skipped_ticks += ticks;
    }
}

impl<T: Clone> SnapshotCell<T> {
    #[must_use]
    pub fn get(&self) -> T {
        self.read().data.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        let guard = self.read();
        Snapshot { data: guard.data.clone(), meta: guard.meta.clone() }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
