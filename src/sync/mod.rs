//! State synchronizers: local mirrors of backend resources.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend never pushes. Each synchronizer owns one snapshot and refreshes
//! it either on a fixed cadence (jobs, logs, workflow status) or on demand
//! (config). Searches go the other way through [`SearchDispatcher`].

pub mod config;
pub mod jobs;
pub mod logs;
pub mod poller;
pub mod search;
pub mod snapshot;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::ConfigSync;
pub use jobs::JobQueueSync;
pub use logs::LogSync;
pub use poller::PollHandle;
pub use search::{DispatchOutcome, SearchDispatcher};
pub use snapshot::{PollPhase, Snapshot, SnapshotCell, SyncMeta};
pub use workflow::WorkflowStatusSync;
