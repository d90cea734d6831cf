//! Search dispatcher: one-way command to start a backend search.
//!
//! The dispatcher does not learn which job a search produced. Its effect
//! shows up, eventually, in the job queue and log snapshots. Repeated or
//! concurrent dispatches are not prevented.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::{ApiError, DashboardApi, SearchRequest};

/// What happened to a dispatched search, as reported to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Backend answered 2xx.
    Accepted,
    /// Backend answered with a non-success status.
    Rejected { status: u16 },
    /// No response (transport failure).
    Failed { reason: String },
}

#[derive(Clone)]
pub struct SearchDispatcher {
    api: Arc<dyn DashboardApi>,
}

impl SearchDispatcher {
    #[must_use]
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }

    /// Send one search request. The term is not validated; an empty term is
    /// sent as-is.
    pub async fn dispatch(&self, term: impl Into<String>, contextual: bool) -> DispatchOutcome {
        let request = SearchRequest::new(term, contextual);
        let outcome = match self.api.start_search(&request).await {
            Ok(()) => DispatchOutcome::Accepted,
            Err(ApiError::Server { status, .. }) => DispatchOutcome::Rejected { status },
            Err(e) => DispatchOutcome::Failed { reason: e.to_string() },
        };

        match &outcome {
            DispatchOutcome::Accepted => {
                info!(term = %request.search_term, contextual, "search initiated");
            }
            DispatchOutcome::Rejected { status } => {
                warn!(term = %request.search_term, contextual, status, "failed to initiate search");
            }
            DispatchOutcome::Failed { reason } => {
                warn!(term = %request.search_term, contextual, error = %reason, "error initiating search");
            }
        }
        outcome
    }

    /// Spawn [`SearchDispatcher::dispatch`] and return without waiting.
    pub fn dispatch_detached(&self, term: String, contextual: bool) -> JoinHandle<DispatchOutcome> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(term, contextual).await })
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
