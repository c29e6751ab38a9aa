//! Delayed job queue for Turnhall.
//!
//! Jobs are named, carry a JSON payload, and fire once after an optional
//! delay. The queue supports removal by handle ([`JobQueue::cancel`],
//! idempotent — "already gone" is success, not an error) and invokes one
//! registered [`JobHandler`] per job name with bounded concurrency.
//!
//! Cancellation takes effect asynchronously: a job that has already
//! begun executing is not suppressed. Handlers therefore re-validate
//! their preconditions against live state before mutating anything —
//! the session layer's expiry handlers treat a stale fire as a no-op.
//!
//! [`TokioJobQueue`] is the in-process implementation: each scheduled
//! job is a Tokio timer task that checks the cancellation table after
//! its delay and again after acquiring a worker permit.

mod error;
mod queue;

pub use error::{JobError, QueueError};
pub use queue::{JobHandler, JobQueue, QueueConfig, TokioJobQueue};
