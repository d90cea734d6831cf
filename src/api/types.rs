//! Wire types for the search backend's dashboard API.
//!
//! DESIGN
//! ======
//! Response envelopes (`{ "jobs": [...] }` and friends) are private; parsing
//! helpers unwrap them and hand callers the payload. Parsing is pure so the
//! shape handling can be tested without a network.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by dashboard API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("server responded with status {status}")]
    Server { status: u16, body: String },

    /// The response body was not the JSON shape we expect.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Grepable code surfaced in dashboard sync metadata.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Server { .. } => "E_SERVER",
            Self::Parse(_) => "E_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

// =============================================================================
// JOBS
// =============================================================================

/// Job identifier as sent by the backend. Numbers and strings are both seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One entry of the backend job queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    /// Nominally 0-100. Not clamped here; out-of-range values pass through.
    pub progress: f64,
    pub status: String,
}

impl Job {
    /// Progress bar width in percent, clamped to the drawable range.
    #[must_use]
    pub fn bar_width(&self) -> f64 {
        if self.progress.is_nan() { 0.0 } else { self.progress.clamp(0.0, 100.0) }
    }
}

// =============================================================================
// LOGS
// =============================================================================

/// Split a backend log line of the form `LEVEL: message` into its level.
///
/// Returns `None` when the line carries no recognizable level prefix.
#[must_use]
pub fn log_level(line: &str) -> Option<&str> {
    let (prefix, _) = line.split_once(": ")?;
    matches!(prefix, "DEBUG" | "INFO" | "WARNING" | "ERROR" | "CRITICAL").then_some(prefix)
}

// =============================================================================
// CONFIG
// =============================================================================

/// One backend configuration value. `value` is `None` when the backend
/// reports it as not set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: Option<String>,
}

impl ConfigEntry {
    /// Build an entry from a raw JSON value, folding falsy values to "not set".
    #[must_use]
    pub fn from_json(key: impl Into<String>, raw: &Value) -> Self {
        Self { key: key.into(), value: config_value_text(raw) }
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Display text: the value verbatim, or `Not set`.
    #[must_use]
    pub fn display_value(&self) -> &str {
        self.value.as_deref().unwrap_or(NOT_SET)
    }
}

/// Label shown for configuration keys without a value.
pub const NOT_SET: &str = "Not set";

fn config_value_text(raw: &Value) -> Option<String> {
    match raw {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_owned()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// WORKFLOW STATUS
// =============================================================================

/// Coarse progress indicator of the backend's search workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub upload_complete: bool,
}

// =============================================================================
// SEARCH
// =============================================================================

/// Body of `POST /api/start_search`. The term is sent as-is, even when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_term: String,
    pub is_contextual: bool,
}

impl SearchRequest {
    #[must_use]
    pub fn new(search_term: impl Into<String>, is_contextual: bool) -> Self {
        Self { search_term: search_term.into(), is_contextual }
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
struct JobQueueEnvelope {
    jobs: Vec<Job>,
}

#[derive(Deserialize)]
struct LogsEnvelope {
    logs: Vec<String>,
}

#[derive(Deserialize)]
struct ConfigEnvelope {
    config: serde_json::Map<String, Value>,
}

fn parse_error(e: serde_json::Error) -> ApiError {
    ApiError::Parse(e.to_string())
}

/// Parse a `/api/job_queue` body.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not `{ "jobs": [...] }`.
pub fn parse_jobs(body: &str) -> Result<Vec<Job>, ApiError> {
    let envelope: JobQueueEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    Ok(envelope.jobs)
}

/// Parse a `/api/logs` body.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not `{ "logs": [string...] }`.
pub fn parse_logs(body: &str) -> Result<Vec<String>, ApiError> {
    let envelope: LogsEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    Ok(envelope.logs)
}

/// Parse a `/api/config` body, keeping the backend's key order.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not `{ "config": { ... } }`.
pub fn parse_config(body: &str) -> Result<Vec<ConfigEntry>, ApiError> {
    let envelope: ConfigEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    Ok(envelope
        .config
        .iter()
        .map(|(key, raw)| ConfigEntry::from_json(key.as_str(), raw))
        .collect())
}

/// Parse a `/api/job_status` body.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not a JSON object.
pub fn parse_workflow_status(body: &str) -> Result<WorkflowStatus, ApiError> {
    serde_json::from_str(body).map_err(parse_error)
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
