//! The [`JobQueue`] seam and its Tokio-timer implementation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::Semaphore;
use turnhall_model::JobId;

use crate::{JobError, QueueError};

/// Executes one kind of named job.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Runs the job. Returning `Err` marks the attempt failed and the
    /// queue retries it; a precondition mismatch should return `Ok(())`.
    async fn run(&self, payload: serde_json::Value) -> Result<(), JobError>;
}

/// Accepts named jobs with a payload and optional delay, and supports
/// removal by handle.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueues a job to fire after `delay`. Returns the handle used to
    /// cancel it later.
    async fn schedule(
        &self,
        name: &str,
        payload: serde_json::Value,
        delay: Duration,
    ) -> Result<JobId, QueueError>;

    /// Removes a pending job. Returns `false` if the job was already
    /// gone (fired, cancelled, or never existed) — that is still
    /// success, not an error.
    async fn cancel(&self, job: JobId) -> Result<bool, QueueError>;
}

/// Settings for [`TokioJobQueue`].
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum handlers running at once per job name.
    pub concurrency: usize,
    /// Total attempts per job before it is dropped as failed.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

struct Registration {
    handler: Arc<dyn JobHandler>,
    /// Worker pool bound, one pool per job name.
    permits: Arc<Semaphore>,
}

/// In-process job queue running each job as a Tokio timer task.
///
/// A pending job lives in the cancellation table until it fires.
/// [`cancel`](JobQueue::cancel) removes the entry; the timer task checks
/// the table after its delay and once more after acquiring a worker
/// permit, then claims the job by removing the entry itself. Whichever
/// side removes the entry first wins — a lost cancel is the benign race
/// the handlers' precondition re-checks absorb.
pub struct TokioJobQueue {
    config: QueueConfig,
    handlers: RwLock<HashMap<String, Registration>>,
    pending: Arc<Mutex<HashSet<JobId>>>,
    next_id: AtomicU64,
}

impl TokioJobQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            handlers: RwLock::new(HashMap::new()),
            pending: Arc::new(Mutex::new(HashSet::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers the handler for a job name, replacing any previous one.
    ///
    /// Must happen before jobs of that name are scheduled; scheduling an
    /// unknown name is rejected.
    pub fn register(&self, name: impl Into<String>, handler: Arc<dyn JobHandler>) {
        let name = name.into();
        let registration = Registration {
            handler,
            permits: Arc::new(Semaphore::new(self.config.concurrency)),
        };
        self.handlers.write().insert(name.clone(), registration);
        tracing::debug!(job_name = %name, "job handler registered");
    }

    /// Number of jobs scheduled but not yet fired or cancelled.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for TokioJobQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

#[async_trait]
impl JobQueue for TokioJobQueue {
    async fn schedule(
        &self,
        name: &str,
        payload: serde_json::Value,
        delay: Duration,
    ) -> Result<JobId, QueueError> {
        let (handler, permits) = {
            let handlers = self.handlers.read();
            let registration = handlers
                .get(name)
                .ok_or_else(|| QueueError::UnknownJob(name.to_string()))?;
            (registration.handler.clone(), registration.permits.clone())
        };

        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.pending.lock().insert(id);

        let pending = self.pending.clone();
        let name = name.to_string();
        let max_attempts = self.config.max_attempts.max(1);
        let retry_delay = self.config.retry_delay;

        tracing::debug!(job = %id, job_name = %name, ?delay, "job scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if !pending.lock().contains(&id) {
                tracing::trace!(job = %id, "job cancelled before firing");
                return;
            }

            let _permit = match permits.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            // Claim the job. Losing here means a cancel won the race
            // while this task waited for a worker permit.
            if !pending.lock().remove(&id) {
                tracing::trace!(job = %id, "job cancelled while awaiting worker");
                return;
            }

            for attempt in 1..=max_attempts {
                match handler.run(payload.clone()).await {
                    Ok(()) => {
                        tracing::debug!(job = %id, job_name = %name, attempt, "job done");
                        return;
                    }
                    Err(error) => {
                        tracing::warn!(
                            job = %id,
                            job_name = %name,
                            attempt,
                            %error,
                            "job attempt failed"
                        );
                        if attempt < max_attempts {
                            tokio::time::sleep(retry_delay).await;
                        }
                    }
                }
            }
            tracing::error!(
                job = %id,
                job_name = %name,
                attempts = max_attempts,
                "job dropped after exhausting attempts"
            );
        });

        Ok(id)
    }

    async fn cancel(&self, job: JobId) -> Result<bool, QueueError> {
        let removed = self.pending.lock().remove(&job);
        tracing::debug!(job = %job, removed, "job cancel");
        Ok(removed)
    }
}
