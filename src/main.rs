use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scoutboard::api::{ApiError, DashboardApi, HttpDashboardApi};
use scoutboard::config::{
    ConfigError, DEFAULT_BACKEND_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_JOB_POLL_MS, DEFAULT_LOG_POLL_MS,
    DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS, DashboardConfig, HttpTimeouts,
};
use scoutboard::render;
use scoutboard::routes;
use scoutboard::state::AppState;

/// How often `watch` checks snapshots for changes.
const WATCH_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("io failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "scoutboard", about = "Polling dashboard for the search workflow backend")]
struct Cli {
    #[arg(long, env = "SCOUTBOARD_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    #[arg(long, env = "SCOUTBOARD_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(long, env = "SCOUTBOARD_JOB_POLL_MS", default_value_t = DEFAULT_JOB_POLL_MS)]
    job_poll_ms: u64,

    #[arg(long, env = "SCOUTBOARD_LOG_POLL_MS", default_value_t = DEFAULT_LOG_POLL_MS)]
    log_poll_ms: u64,

    #[arg(long, env = "SCOUTBOARD_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    #[arg(long, env = "SCOUTBOARD_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pollers and serve the dashboard page.
    Serve,
    /// Run the pollers and print job and log snapshots as they change.
    Watch,
    /// Start a backend search.
    Search {
        term: String,
        #[arg(long, default_value_t = false)]
        contextual: bool,
    },
    /// Fetch and print the backend configuration once.
    Config,
    /// Fetch and print the job queue once.
    Jobs,
    /// Fetch and print the log once.
    Logs,
    /// Fetch and print the workflow status once.
    Status,
}

impl Cli {
    fn dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        DashboardConfig {
            backend_url: self.backend_url.clone(),
            port: self.port,
            job_poll: Duration::from_millis(self.job_poll_ms),
            log_poll: Duration::from_millis(self.log_poll_ms),
            timeouts: HttpTimeouts {
                request: Duration::from_secs(self.request_timeout_secs),
                connect: Duration::from_secs(self.connect_timeout_secs),
            },
        }
        .validated()
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.dashboard_config()?;
    let api: Arc<dyn DashboardApi> =
        Arc::new(HttpDashboardApi::new(settings.backend_url.clone(), settings.timeouts)?);
    let state = AppState::new(api, &settings);

    match cli.command {
        Command::Serve => serve(state, &settings).await?,
        Command::Watch => watch(state).await,
        Command::Search { term, contextual } => {
            let outcome = state.search.dispatch(term, contextual).await;
            println!("{}", serde_json::to_string(&outcome).unwrap_or_else(|_| format!("{outcome:?}")));
        }
        Command::Config => {
            state.config.refresh().await?;
            print!("{}", render::config_text(&state.config.entries()));
        }
        Command::Jobs => {
            state.jobs.poll_once().await?;
            print!("{}", render::jobs_text(&state.jobs.jobs()));
        }
        Command::Logs => {
            state.logs.poll_once().await?;
            for line in state.logs.lines() {
                println!("{line}");
            }
        }
        Command::Status => {
            state.workflow.poll_once().await?;
            let status = state.workflow.status();
            println!(
                "next step: {}\nupload complete: {}",
                status.next_step.as_deref().unwrap_or("idle"),
                status.upload_complete
            );
        }
    }
    Ok(())
}

async fn serve(state: AppState, settings: &DashboardConfig) -> Result<(), CliError> {
    // Config is fetched once when the dashboard activates and never re-polled.
    let _ = state.config.refresh().await;
    let pollers = state.start_pollers();

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port)).await?;
    info!(port = settings.port, backend = %settings.backend_url, "scoutboard listening");
    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pollers.stop().await;
    info!("scoutboard stopped");
    Ok(())
}

async fn watch(state: AppState) {
    let pollers = state.start_pollers();
    let mut ticker = tokio::time::interval(WATCH_TICK);
    let (mut jobs_seen, mut logs_seen) = (0, 0);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        let jobs = state.jobs.snapshot();
        if jobs.meta.version != jobs_seen {
            jobs_seen = jobs.meta.version;
            println!("--- jobs ---");
            print!("{}", render::jobs_text(&jobs.data));
        }

        let logs = state.logs.snapshot();
        if logs.meta.version != logs_seen {
            logs_seen = logs.meta.version;
            println!("--- logs ---");
            for line in &logs.data {
                println!("{line}");
            }
        }
    }

    pollers.stop().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
