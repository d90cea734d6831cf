//! reqwest client for the dashboard API.
//!
//! Thin HTTP wrapper: every call checks the status, reads the body as text,
//! and hands it to the pure parsers in [`super::types`].

use reqwest::Response;
use tracing::debug;

use super::DashboardApi;
use super::types::{self, ApiError, ConfigEntry, Job, SearchRequest, WorkflowStatus};
use crate::config::HttpTimeouts;

pub const CONFIG_PATH: &str = "/api/config";
pub const JOB_QUEUE_PATH: &str = "/api/job_queue";
pub const LOGS_PATH: &str = "/api/logs";
pub const JOB_STATUS_PATH: &str = "/api/job_status";
pub const START_SEARCH_PATH: &str = "/api/start_search";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpDashboardApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDashboardApi {
    /// Build a client for the backend at `base_url` (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the reqwest client fails to build.
    pub fn new(base_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_success_body(response).await
    }
}

/// Read the body of a 2xx response, or turn anything else into [`ApiError::Server`].
///
/// The status decides the error kind; a non-2xx body that cannot be read
/// leaves the error text empty.
async fn read_success_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Server { status: status.as_u16(), body });
    }

    response.text().await.map_err(|e| ApiError::Transport(e.to_string()))
}

#[async_trait::async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_config(&self) -> Result<Vec<ConfigEntry>, ApiError> {
        types::parse_config(&self.get_text(CONFIG_PATH).await?)
    }

    async fn fetch_jobs(&self) -> Result<Vec<Job>, ApiError> {
        types::parse_jobs(&self.get_text(JOB_QUEUE_PATH).await?)
    }

    async fn fetch_logs(&self) -> Result<Vec<String>, ApiError> {
        types::parse_logs(&self.get_text(LOGS_PATH).await?)
    }

    async fn fetch_workflow_status(&self) -> Result<WorkflowStatus, ApiError> {
        types::parse_workflow_status(&self.get_text(JOB_STATUS_PATH).await?)
    }

    async fn start_search(&self, request: &SearchRequest) -> Result<(), ApiError> {
        debug!(path = START_SEARCH_PATH, "POST");
        let response = self
            .http
            .post(self.url(START_SEARCH_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_success_body(response).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
