//! Scripted [`DashboardApi`] for synchronizer and route tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::{ApiError, ConfigEntry, DashboardApi, Job, JobId, SearchRequest, WorkflowStatus};

type Script<T> = Mutex<VecDeque<Result<T, ApiError>>>;

/// Each endpoint replays its scripted results in order, then answers with
/// an empty success once the script runs out.
#[derive(Default)]
pub(crate) struct MockApi {
    pub config: Script<Vec<ConfigEntry>>,
    pub jobs: Script<Vec<Job>>,
    pub logs: Script<Vec<String>>,
    pub workflow: Script<WorkflowStatus>,
    pub search: Script<()>,
    pub searches: Mutex<Vec<SearchRequest>>,
    pub config_calls: AtomicUsize,
    pub job_calls: AtomicUsize,
    pub log_calls: AtomicUsize,
}

impl MockApi {
    pub fn push_jobs(&self, result: Result<Vec<Job>, ApiError>) {
        self.jobs.lock().unwrap().push_back(result);
    }

    pub fn push_logs(&self, result: Result<Vec<String>, ApiError>) {
        self.logs.lock().unwrap().push_back(result);
    }

    pub fn push_config(&self, result: Result<Vec<ConfigEntry>, ApiError>) {
        self.config.lock().unwrap().push_back(result);
    }

    pub fn push_workflow(&self, result: Result<WorkflowStatus, ApiError>) {
        self.workflow.lock().unwrap().push_back(result);
    }

    pub fn push_search(&self, result: Result<(), ApiError>) {
        self.search.lock().unwrap().push_back(result);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn next<T: Default>(script: &Script<T>) -> Result<T, ApiError> {
    script.lock().unwrap().pop_front().unwrap_or_else(|| Ok(T::default()))
}

#[async_trait::async_trait]
impl DashboardApi for MockApi {
    async fn fetch_config(&self) -> Result<Vec<ConfigEntry>, ApiError> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.config)
    }

    async fn fetch_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.job_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.jobs)
    }

    async fn fetch_logs(&self) -> Result<Vec<String>, ApiError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.logs)
    }

    async fn fetch_workflow_status(&self) -> Result<WorkflowStatus, ApiError> {
        next(&self.workflow)
    }

    async fn start_search(&self, request: &SearchRequest) -> Result<(), ApiError> {
        self.searches.lock().unwrap().push(request.clone());
        next(&self.search)
    }
}

pub(crate) fn job(id: i64, name: &str, progress: f64, status: &str) -> Job {
    Job { id: JobId::Number(id), name: name.to_owned(), progress, status: status.to_owned() }
}

pub(crate) fn entry(key: &str, value: Option<&str>) -> ConfigEntry {
    ConfigEntry { key: key.to_owned(), value: value.map(str::to_owned) }
}
