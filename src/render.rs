//! HTML and plain-text rendering of dashboard snapshots.
//!
//! The page is server-rendered from the minijinja templates under
//! `templates/`. The live part (workflow status, job queue, log console) is
//! also served on its own at `/live`, and a short inline script swaps it in
//! on the log cadence. The config panel is rendered once per page load since
//! config is never polled.
//!
//! Backend text reaches the page only through template expressions, which
//! are HTML auto-escaped.

use std::fmt::Write as _;
use std::sync::LazyLock;

use minijinja::Environment;
use serde::Serialize;

use crate::api::types::log_level;
use crate::api::{ConfigEntry, Job, WorkflowStatus};
use crate::state::DashboardSnapshot;
use crate::sync::{PollPhase, SyncMeta};

pub type RenderResult = Result<String, minijinja::Error>;

// =============================================================================
// TEMPLATES
// =============================================================================

/// Template sources, keyed by the name `{% include %}` uses.
const TEMPLATES: &[(&str, &str)] = &[
    ("page.html", include_str!("../templates/page.html")),
    ("live.html", include_str!("../templates/live.html")),
    ("jobs.html", include_str!("../templates/jobs.html")),
    ("job.html", include_str!("../templates/job.html")),
    ("logs.html", include_str!("../templates/logs.html")),
    ("config.html", include_str!("../templates/config.html")),
];

/// `.html` names get minijinja's HTML auto-escaping. Templates are parsed on
/// first use; a syntax error comes back from the render call.
static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
    env.set_loader(|name| {
        Ok(TEMPLATES.iter().find(|(key, _)| *key == name).map(|(_, source)| (*source).to_owned()))
    });
    env
});

fn render_template<S: Serialize>(name: &str, ctx: S) -> RenderResult {
    ENV.get_template(name)?.render(ctx)
}

// =============================================================================
// VIEWS
// =============================================================================

#[derive(Serialize)]
struct Section<T> {
    items: Vec<T>,
    /// Error code of the last failed fetch while the panel shows stale data.
    stale: Option<&'static str>,
}

impl<T> Section<T> {
    fn new(items: Vec<T>, meta: &SyncMeta) -> Self {
        let stale = match (&meta.phase, &meta.last_error) {
            (PollPhase::Failed, Some(err)) => Some(err.code),
            _ => None,
        };
        Self { items, stale }
    }
}

#[derive(Serialize)]
struct WorkflowView<'a> {
    next_step: &'a str,
    upload: &'static str,
}

impl<'a> From<&'a WorkflowStatus> for WorkflowView<'a> {
    fn from(status: &'a WorkflowStatus) -> Self {
        Self {
            next_step: status.next_step.as_deref().unwrap_or("idle"),
            upload: if status.upload_complete { "complete" } else { "pending" },
        }
    }
}

#[derive(Serialize)]
struct JobView<'a> {
    id: String,
    name: &'a str,
    status: &'a str,
    /// Bar width in percent, already clamped to 0..=100.
    width: String,
    progress: String,
}

impl<'a> From<&'a Job> for JobView<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            id: job.id.to_string(),
            name: &job.name,
            status: &job.status,
            width: format_number(job.bar_width()),
            progress: format_progress(job.progress),
        }
    }
}

#[derive(Serialize)]
struct LogLineView<'a> {
    text: &'a str,
    level: Option<String>,
}

impl<'a> From<&'a String> for LogLineView<'a> {
    fn from(line: &'a String) -> Self {
        Self { text: line, level: log_level(line).map(str::to_ascii_lowercase) }
    }
}

#[derive(Serialize)]
struct ConfigView<'a> {
    key: &'a str,
    value: &'a str,
    is_set: bool,
}

impl<'a> From<&'a ConfigEntry> for ConfigView<'a> {
    fn from(entry: &'a ConfigEntry) -> Self {
        Self { key: &entry.key, value: entry.display_value(), is_set: entry.is_set() }
    }
}

#[derive(Serialize)]
struct LiveView<'a> {
    workflow: WorkflowView<'a>,
    jobs: Section<JobView<'a>>,
    logs: Section<LogLineView<'a>>,
}

impl<'a> From<&'a DashboardSnapshot> for LiveView<'a> {
    fn from(dash: &'a DashboardSnapshot) -> Self {
        Self {
            workflow: WorkflowView::from(&dash.workflow.data),
            jobs: jobs_section(&dash.jobs.data, &dash.jobs.meta),
            logs: logs_section(&dash.logs.data, &dash.logs.meta),
        }
    }
}

#[derive(Serialize)]
struct PageView<'a> {
    #[serde(flatten)]
    live: LiveView<'a>,
    config: Section<ConfigView<'a>>,
    refresh_ms: u64,
    refresh_secs: u64,
}

fn jobs_section<'a>(jobs: &'a [Job], meta: &SyncMeta) -> Section<JobView<'a>> {
    Section::new(jobs.iter().map(JobView::from).collect(), meta)
}

fn logs_section<'a>(lines: &'a [String], meta: &SyncMeta) -> Section<LogLineView<'a>> {
    Section::new(lines.iter().map(LogLineView::from).collect(), meta)
}

fn config_section<'a>(entries: &'a [ConfigEntry], meta: &SyncMeta) -> Section<ConfigView<'a>> {
    Section::new(entries.iter().map(ConfigView::from).collect(), meta)
}

// =============================================================================
// PAGE
// =============================================================================

/// Full dashboard page.
///
/// # Errors
///
/// Returns the template error if rendering fails.
pub fn render_page(dash: &DashboardSnapshot, refresh_ms: u64) -> RenderResult {
    render_template(
        "page.html",
        PageView {
            live: LiveView::from(dash),
            config: config_section(&dash.config.data, &dash.config.meta),
            refresh_ms,
            refresh_secs: refresh_ms.div_ceil(1000),
        },
    )
}

/// The polled part of the page.
///
/// # Errors
///
/// Returns the template error if rendering fails.
pub fn render_live(dash: &DashboardSnapshot) -> RenderResult {
    render_template("live.html", LiveView::from(dash))
}

// =============================================================================
// TEXT
// =============================================================================

/// Job queue as terminal lines: `[#####.....]   50% crawl (running) #7`.
#[must_use]
pub fn jobs_text(jobs: &[Job]) -> String {
    let mut out = String::new();
    for job in jobs {
        let filled = text_bar_cells(job.bar_width());
        let _ = writeln!(
            out,
            "[{}{}] {:>5} {} ({}) #{}",
            "#".repeat(filled),
            ".".repeat(10 - filled),
            format_progress(job.progress),
            job.name,
            job.status,
            job.id
        );
    }
    out
}

/// Config entries with set / not-set markers.
#[must_use]
pub fn config_text(entries: &[ConfigEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let mark = if entry.is_set() { '✓' } else { '✗' };
        let _ = writeln!(out, "{mark} {}: {}", entry.key, entry.display_value());
    }
    out
}

// =============================================================================
// HELPERS
// =============================================================================

/// Numeric progress as sent by the backend; out-of-range values pass through.
#[must_use]
pub fn format_progress(progress: f64) -> String {
    format!("{}%", format_number(progress))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 { format!("{value:.0}") } else { format!("{value:.1}") }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn text_bar_cells(width: f64) -> usize {
    ((width / 10.0).round() as usize).min(10)
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
