//! Error types for the job queue.

/// Errors raised by [`JobQueue`](crate::JobQueue) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// No handler is registered for the given job name, so the job
    /// would never execute. Raised at scheduling time.
    #[error("no handler registered for job name {0:?}")]
    UnknownJob(String),

    /// The backing queue is unreachable or failed mid-operation.
    #[error("job queue unavailable: {0}")]
    Unavailable(String),
}

/// A failure inside a job handler's execution.
///
/// Distinct from a precondition mismatch: handlers that find their
/// precondition no longer holds return `Ok(())` and the job counts as
/// done. A `JobError` means real work failed and the queue retries it
/// up to the configured attempt limit.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct JobError(pub String);

impl JobError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
