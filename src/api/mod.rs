//! Backend API: the HTTP contract the dashboard consumes.
//!
//! DESIGN
//! ======
//! Synchronizers talk to the backend through the [`DashboardApi`] trait so
//! they can be driven by a mock in tests. [`client::HttpDashboardApi`] is the
//! reqwest implementation used by the binary.

pub mod client;
pub mod types;

pub use client::HttpDashboardApi;
pub use types::{ApiError, ConfigEntry, Job, JobId, SearchRequest, WorkflowStatus};

/// Endpoints of the search backend's dashboard API.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/config`
    async fn fetch_config(&self) -> Result<Vec<ConfigEntry>, ApiError>;

    /// `GET /api/job_queue`
    async fn fetch_jobs(&self) -> Result<Vec<Job>, ApiError>;

    /// `GET /api/logs`
    async fn fetch_logs(&self) -> Result<Vec<String>, ApiError>;

    /// `GET /api/job_status`
    async fn fetch_workflow_status(&self) -> Result<WorkflowStatus, ApiError>;

    /// `POST /api/start_search`. The response body is opaque; only the
    /// status is checked.
    async fn start_search(&self, request: &SearchRequest) -> Result<(), ApiError>;
}
