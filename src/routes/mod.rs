//! Router assembly for the web shell.
//!
//! SYSTEM CONTEXT
//! ==============
//! Handlers only read snapshots and trigger synchronizers; nothing here
//! talks to the backend directly. Fetch failures never surface as HTTP
//! errors: the page keeps rendering the last good data.

use axum::Router;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, Json, Redirect};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::render;
use crate::state::{AppState, DashboardSnapshot};

/// Build the dashboard router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/live", get(live))
        .route("/search", post(start_search))
        .route("/api/dashboard", get(dashboard))
        .route("/api/config/refresh", post(refresh_config))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /`: full dashboard page.
async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let refresh_ms = u64::try_from(state.page_refresh.as_millis()).unwrap_or(u64::MAX);
    html(render::render_page(&state.dashboard(), refresh_ms))
}

/// `GET /live`: the polled fragment of the page.
async fn live(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    html(render::render_live(&state.dashboard()))
}

fn html(rendered: render::RenderResult) -> Result<Html<String>, StatusCode> {
    rendered.map(Html).map_err(|e| {
        error!(error = %e, "template render failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Search form body. An unchecked checkbox is simply absent.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub contextual: Option<String>,
}

impl SearchForm {
    #[must_use]
    pub fn is_contextual(&self) -> bool {
        self.contextual.as_deref().is_some_and(|v| !v.is_empty() && v != "off" && v != "false")
    }
}

/// `POST /search`: dispatch and go straight back to the dashboard.
async fn start_search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Redirect {
    let contextual = form.is_contextual();
    let _ = state.search.dispatch_detached(form.term, contextual);
    Redirect::to("/")
}

/// `GET /api/dashboard`: every snapshot with its sync metadata.
async fn dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard())
}

/// `POST /api/config/refresh`: explicit config refresh.
async fn refresh_config(State(state): State<AppState>) -> StatusCode {
    // Failure is already logged and recorded in the config metadata.
    let _ = state.config.refresh().await;
    StatusCode::NO_CONTENT
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
