//! Integration tests for the Tokio job queue.
//!
//! Uses `tokio::time::pause()` (via `start_paused = true`) so delays
//! resolve deterministically without wall-clock waits.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use turnhall_jobs::{JobError, JobHandler, JobQueue, QueueConfig, QueueError, TokioJobQueue};

// =========================================================================
// Helpers
// =========================================================================

/// Counts how many times it ran; optionally fails the first N attempts
/// and holds a worker for a while to exercise the concurrency bound.
struct CountingHandler {
    runs: AtomicU32,
    fail_first: u32,
    hold: Duration,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl CountingHandler {
    fn new() -> Arc<Self> {
        Self::with(0, Duration::ZERO)
    }

    fn with(fail_first: u32, hold: Duration) -> Arc<Self> {
        Arc::new(Self {
            runs: AtomicU32::new(0),
            fail_first,
            hold,
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
        })
    }

    fn runs(&self) -> u32 {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobHandler for CountingHandler {
    async fn run(&self, _payload: serde_json::Value) -> Result<(), JobError> {
        let attempt = self.runs.fetch_add(1, Ordering::SeqCst) + 1;

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);

        if attempt <= self.fail_first {
            return Err(JobError::new(format!("induced failure on attempt {attempt}")));
        }
        Ok(())
    }
}

fn queue_with(config: QueueConfig) -> TokioJobQueue {
    TokioJobQueue::new(config)
}

/// Yields until `condition` holds, bounded by (paused) time.
async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(60), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// =========================================================================
// Scheduling and firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_job_fires_after_delay() {
    let queue = TokioJobQueue::default();
    let handler = CountingHandler::new();
    queue.register("noop", handler.clone());

    queue
        .schedule("noop", json!({"k": 1}), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(queue.pending_len(), 1);

    wait_until(|| handler.runs() == 1).await;
    assert_eq!(queue.pending_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_delay_job_fires() {
    let queue = TokioJobQueue::default();
    let handler = CountingHandler::new();
    queue.register("noop", handler.clone());

    queue.schedule("noop", json!({}), Duration::ZERO).await.unwrap();

    wait_until(|| handler.runs() == 1).await;
}

#[tokio::test(start_paused = true)]
async fn test_schedule_unknown_name_is_rejected() {
    let queue = TokioJobQueue::default();

    let err = queue
        .schedule("nobody home", json!({}), Duration::ZERO)
        .await
        .unwrap_err();

    assert_eq!(err, QueueError::UnknownJob("nobody home".into()));
    assert_eq!(queue.pending_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_jobs_get_distinct_handles() {
    let queue = TokioJobQueue::default();
    queue.register("noop", CountingHandler::new());

    let a = queue
        .schedule("noop", json!({}), Duration::from_secs(60))
        .await
        .unwrap();
    let b = queue
        .schedule("noop", json!({}), Duration::from_secs(60))
        .await
        .unwrap();
    assert_ne!(a, b);
}

// =========================================================================
// Cancellation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_before_fire_suppresses_handler() {
    let queue = TokioJobQueue::default();
    let handler = CountingHandler::new();
    queue.register("noop", handler.clone());

    let job = queue
        .schedule("noop", json!({}), Duration::from_secs(10))
        .await
        .unwrap();

    assert!(queue.cancel(job).await.unwrap());
    assert_eq!(queue.pending_len(), 0);

    // Let the timer elapse; the handler must never run.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(handler.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_double_cancel_is_idempotent() {
    let queue = TokioJobQueue::default();
    queue.register("noop", CountingHandler::new());

    let job = queue
        .schedule("noop", json!({}), Duration::from_secs(10))
        .await
        .unwrap();

    assert!(queue.cancel(job).await.unwrap());
    // Second cancel reports "already gone" — success, not an error.
    assert!(!queue.cancel(job).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_unknown_handle_is_success() {
    let queue = TokioJobQueue::default();
    assert!(!queue.cancel(turnhall_model::JobId(12345)).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_fire_returns_false() {
    let queue = TokioJobQueue::default();
    let handler = CountingHandler::new();
    queue.register("noop", handler.clone());

    let job = queue.schedule("noop", json!({}), Duration::ZERO).await.unwrap();
    wait_until(|| handler.runs() == 1).await;

    assert!(!queue.cancel(job).await.unwrap());
}

// =========================================================================
// Bounded concurrency
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_bounded_per_job_name() {
    let queue = queue_with(QueueConfig {
        concurrency: 2,
        ..QueueConfig::default()
    });
    let handler = CountingHandler::with(0, Duration::from_millis(100));
    queue.register("slow", handler.clone());

    for _ in 0..6 {
        queue.schedule("slow", json!({}), Duration::ZERO).await.unwrap();
    }

    wait_until(|| handler.runs() == 6).await;
    assert!(
        handler.max_running.load(Ordering::SeqCst) <= 2,
        "worker pool bound exceeded: {}",
        handler.max_running.load(Ordering::SeqCst)
    );
}

// =========================================================================
// Retry
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_failed_job_retries_until_success() {
    let queue = queue_with(QueueConfig {
        max_attempts: 3,
        retry_delay: Duration::from_millis(50),
        ..QueueConfig::default()
    });
    let handler = CountingHandler::with(2, Duration::ZERO);
    queue.register("flaky", handler.clone());

    queue.schedule("flaky", json!({}), Duration::ZERO).await.unwrap();

    // Fails twice, succeeds on the third attempt.
    wait_until(|| handler.runs() == 3).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(handler.runs(), 3, "no attempts after success");
}

#[tokio::test(start_paused = true)]
async fn test_job_dropped_after_attempt_limit() {
    let queue = queue_with(QueueConfig {
        max_attempts: 2,
        retry_delay: Duration::from_millis(50),
        ..QueueConfig::default()
    });
    let handler = CountingHandler::with(u32::MAX, Duration::ZERO);
    queue.register("doomed", handler.clone());

    queue.schedule("doomed", json!({}), Duration::ZERO).await.unwrap();

    wait_until(|| handler.runs() == 2).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(handler.runs(), 2, "attempts stop at the limit");
}
