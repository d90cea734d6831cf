use super::*;
use crate::sync::snapshot::PollPhase;
use crate::sync::test_helpers::MockApi;

fn status(next_step: Option<&str>, upload_complete: bool) -> WorkflowStatus {
    WorkflowStatus { next_step: next_step.map(str::to_owned), upload_complete }
}

#[tokio::test(start_paused = true)]
async fn tracks_step_changes_on_cadence() {
    let mock = Arc::new(MockApi::default());
    mock.push_workflow(Ok(status(Some("review"), false)));
    mock.push_workflow(Ok(status(Some("upload"), true)));
    let sync = WorkflowStatusSync::new(Arc::clone(&mock) as Arc<dyn DashboardApi>, Duration::from_secs(5));

    let handle = sync.start();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(sync.status(), status(Some("review"), false));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(sync.status(), status(Some("upload"), true));
    assert_eq!(sync.snapshot().meta.version, 2);

    handle.stop().await;
    assert_eq!(sync.snapshot().meta.phase, PollPhase::Stopped);
}

#[tokio::test]
async fn failure_keeps_last_status() {
    let mock = Arc::new(MockApi::default());
    mock.push_workflow(Ok(status(Some("review"), false)));
    mock.push_workflow(Err(ApiError::Parse("missing field".into())));
    let sync = WorkflowStatusSync::new(Arc::clone(&mock) as Arc<dyn DashboardApi>, Duration::from_secs(5));

    sync.poll_once().await.unwrap();
    let err = sync.poll_once().await.unwrap_err();

    assert_eq!(err.error_code(), "E_PARSE");
    assert_eq!(sync.status().next_step.as_deref(), Some("review"));
    let meta = sync.snapshot().meta;
    assert_eq!(meta.phase, PollPhase::Failed);
    assert_eq!(meta.failures, 1);
}
