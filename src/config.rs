//! Dashboard configuration: backend location, poll cadences, HTTP timeouts.
//!
//! The binary fills this from clap flags (which fall back to the same env
//! vars); library callers can use [`DashboardConfig::from_env`].

use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_JOB_POLL_MS: u64 = 5000;
pub const DEFAULT_LOG_POLL_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid backend URL '{0}' (expected http:// or https://)")]
    InvalidBackendUrl(String),
    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Backend base URL without a trailing slash.
    pub backend_url: String,
    /// Port the web shell listens on.
    pub port: u16,
    /// Job queue and workflow status cadence.
    pub job_poll: Duration,
    /// Log cadence.
    pub log_poll: Duration,
    pub timeouts: HttpTimeouts,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            port: DEFAULT_PORT,
            job_poll: Duration::from_millis(DEFAULT_JOB_POLL_MS),
            log_poll: Duration::from_millis(DEFAULT_LOG_POLL_MS),
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl DashboardConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SCOUTBOARD_BACKEND_URL`: default `http://127.0.0.1:8000`
    /// - `SCOUTBOARD_PORT`: default 3000
    /// - `SCOUTBOARD_JOB_POLL_MS`: default 5000
    /// - `SCOUTBOARD_LOG_POLL_MS`: default 2000
    /// - `SCOUTBOARD_REQUEST_TIMEOUT_SECS`: default 10
    /// - `SCOUTBOARD_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting config fails [`DashboardConfig::validated`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url =
            std::env::var("SCOUTBOARD_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_owned());
        Self {
            backend_url,
            port: env_parse("SCOUTBOARD_PORT", DEFAULT_PORT),
            job_poll: Duration::from_millis(env_parse("SCOUTBOARD_JOB_POLL_MS", DEFAULT_JOB_POLL_MS)),
            log_poll: Duration::from_millis(env_parse("SCOUTBOARD_LOG_POLL_MS", DEFAULT_LOG_POLL_MS)),
            timeouts: HttpTimeouts {
                request: Duration::from_secs(env_parse(
                    "SCOUTBOARD_REQUEST_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                )),
                connect: Duration::from_secs(env_parse(
                    "SCOUTBOARD_CONNECT_TIMEOUT_SECS",
                    DEFAULT_CONNECT_TIMEOUT_SECS,
                )),
            },
        }
        .validated()
    }

    /// Normalize and check the config: trims trailing slashes from the
    /// backend URL, requires an http(s) scheme and non-zero durations.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.backend_url = self.backend_url.trim().trim_end_matches('/').to_owned();
        let has_scheme = self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://");
        let has_host = self.backend_url.split_once("://").is_some_and(|(_, rest)| !rest.is_empty());
        if !has_scheme || !has_host {
            return Err(ConfigError::InvalidBackendUrl(self.backend_url));
        }

        let durations = [
            ("job poll interval", self.job_poll),
            ("log poll interval", self.log_poll),
            ("request timeout", self.timeouts.request),
            ("connect timeout", self.timeouts.connect),
        ];
        if let Some(&(name, _)) = durations.iter().find(|(_, d)| d.is_zero()) {
            return Err(ConfigError::ZeroDuration { name });
        }

        Ok(self)
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
