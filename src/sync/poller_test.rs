use super::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fetcher that records when each fetch starts and replays scripted outcomes.
#[derive(Clone)]
struct Scripted {
    origin: Instant,
    delay: Duration,
    starts: Arc<Mutex<Vec<Duration>>>,
    outcomes: Arc<Mutex<VecDeque<Result<Vec<u32>, ApiError>>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(delay: Duration, outcomes: Vec<Result<Vec<u32>, ApiError>>) -> Self {
        Self {
            origin: Instant::now(),
            delay,
            starts: Arc::default(),
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
        }
    }

    fn start(&self, cadence: Duration, cell: &SnapshotCell<Vec<u32>>) -> PollHandle {
        let script = self.clone();
        spawn_poller("test", cadence, cell.clone(), move || {
            let script = script.clone();
            async move { script.fetch().await }
        })
    }

    async fn fetch(&self) -> Result<Vec<u32>, ApiError> {
        let n = {
            let mut starts = self.starts.lock().unwrap();
            starts.push(self.origin.elapsed());
            starts.len()
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let scripted = self.outcomes.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(vec![u32::try_from(n).unwrap()]))
    }

    fn start_secs(&self) -> Vec<u64> {
        self.starts.lock().unwrap().iter().map(Duration::as_secs).collect()
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

// =============================================================================
// Cadence
// =============================================================================

#[tokio::test(start_paused = true)]
async fn fetches_immediately_then_every_cadence() {
    let cell = SnapshotCell::new(Vec::new());
    let script = Scripted::new(Duration::ZERO, vec![]);
    let _handle = script.start(secs(5), &cell);

    tokio::time::sleep(secs(11)).await;

    assert_eq!(script.start_secs(), [0, 5, 10]);
    assert_eq!(cell.get(), [3]);
    assert_eq!(cell.meta().successes, 3);
}

#[tokio::test(start_paused = true)]
async fn shorter_cadence_polls_more_often() {
    let cell = SnapshotCell::new(Vec::new());
    let script = Scripted::new(Duration::ZERO, vec![]);
    let _handle = script.start(secs(2), &cell);

    tokio::time::sleep(secs(7)).await;

    assert_eq!(script.start_secs(), [0, 2, 4, 6]);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn failures_keep_previous_snapshot_and_polling_continues() {
    let cell = SnapshotCell::new(Vec::new());
    let script = Scripted::new(
        Duration::ZERO,
        vec![
            Ok(vec![1, 2]),
            Err(ApiError::Server { status: 500, body: String::new() }),
            Ok(vec![3]),
            Err(ApiError::Transport("connection refused".into())),
            Err(ApiError::Parse("expected value".into())),
        ],
    );
    let _handle = script.start(secs(5), &cell);

    tokio::time::sleep(secs(1)).await;
    assert_eq!(cell.get(), [1, 2]);

    tokio::time::sleep(secs(5)).await;
    assert_eq!(cell.get(), [1, 2]);
    assert_eq!(cell.phase(), PollPhase::Failed);

    tokio::time::sleep(secs(5)).await;
    assert_eq!(cell.get(), [3]);

    tokio::time::sleep(secs(10)).await;
    assert_eq!(cell.get(), [3]);
    let meta = cell.meta();
    assert_eq!(meta.fetches, 5);
    assert_eq!(meta.successes, 2);
    assert_eq!(meta.failures, 3);
    assert_eq!(meta.last_error.unwrap().code, "E_PARSE");
}

// =============================================================================
// Teardown
// =============================================================================

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_fetches() {
    let cell = SnapshotCell::new(Vec::new());
    let script = Scripted::new(Duration::ZERO, vec![]);
    let handle = script.start(secs(5), &cell);

    tokio::time::sleep(secs(6)).await;
    assert_eq!(script.start_secs(), [0, 5]);

    handle.stop().await;
    tokio::time::sleep(secs(30)).await;

    assert_eq!(script.start_secs(), [0, 5]);
    assert_eq!(cell.phase(), PollPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_cancels_poller() {
    let cell = SnapshotCell::new(Vec::new());
    let script = Scripted::new(Duration::ZERO, vec![]);
    let handle = script.start(secs(2), &cell);

    tokio::time::sleep(secs(3)).await;
    drop(handle);
    tokio::time::sleep(secs(20)).await;

    assert_eq!(script.start_secs(), [0, 2]);
    assert_eq!(cell.phase(), PollPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn stop_before_first_fetch_counts_nothing() {
    let cell = SnapshotCell::new(Vec::new());
    let script = Scripted::new(Duration::ZERO, vec![]);
    let handle = script.start(secs(5), &cell);

    handle.stop().await;

    assert!(script.start_secs().is_empty());
    assert_eq!(cell.meta().fetches, 0);
    assert_eq!(cell.phase(), PollPhase::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropped_handle_never_applies_late_result() {
    let cell = SnapshotCell::new(vec![42]);
    let script = Scripted::new(Duration::from_millis(50), vec![Ok(vec![1])]);
    let handle = script.start(secs(5), &cell);

    tokio::time::sleep(Duration::from_millis(10)).await;
    drop(handle);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(cell.get(), [42]);
    assert_eq!(cell.meta().successes, 0);
    assert_eq!(cell.phase(), PollPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn stop_discards_in_flight_result() {
    let cell = SnapshotCell::new(vec![42]);
    let script = Scripted::new(secs(3), vec![Ok(vec![1])]);
    let handle = script.start(secs(5), &cell);

    tokio::time::sleep(secs(1)).await;
    assert_eq!(script.start_secs(), [0]);

    handle.stop().await;
    tokio::time::sleep(secs(10)).await;

    assert_eq!(cell.get(), [42]);
    assert_eq!(cell.meta().successes, 0);
    assert_eq!(cell.phase(), PollPhase::Stopped);
}

// =============================================================================
// Overlap
// =============================================================================

#[tokio::test(start_paused = true)]
async fn slow_fetch_skips_ticks_instead_of_overlapping() {
    let cell = SnapshotCell::new(Vec::new());
    let script = Scripted::new(secs(7), vec![]);
    let handle = script.start(secs(5), &cell);

    tokio::time::sleep(secs(21)).await;

    assert_eq!(script.start_secs(), [0, 10, 20]);
    assert_eq!(script.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(cell.meta().skipped_ticks, 2);
    assert!(!handle.is_finished());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn zero_cadence_is_raised_and_still_stoppable() {
    let cell = SnapshotCell::new(Vec::new());
    let script = Scripted::new(Duration::from_millis(5), vec![]);
    let handle = script.start(Duration::ZERO, &cell);

    tokio::time::sleep(Duration::from_millis(50)).await;
    tokio::time::timeout(secs(2), handle.stop()).await.unwrap();

    let fetched = script.starts.lock().unwrap().len();
    assert!(fetched >= 2, "expected repeated fetches, got {fetched}");
    assert_eq!(script.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(cell.phase(), PollPhase::Stopped);
}
