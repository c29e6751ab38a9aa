//! Timeout scheduler adapter: the lifecycle's view of the job queue.
//!
//! Owns no state itself — it is invoked by every transition that changes
//! who must act next or whether the session is still waiting. Job
//! payloads are JSON, mirroring what the queue stores.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use turnhall_jobs::JobQueue;
use turnhall_model::{GameId, JobId, PlayerId};

use crate::GameError;

/// Job name for the lobby decision forced after the grace period.
pub const LOBBY_EXPIRY_JOB: &str = "game lobby expiry";

/// Job name for the forced rotation when an occupant does not act.
pub const TURN_EXPIRY_JOB: &str = "game turn expiry";

/// Schedules, reschedules, and cancels the two delayed-task kinds.
pub struct TimeoutScheduler {
    queue: Arc<dyn JobQueue>,
}

impl TimeoutScheduler {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }

    /// Enqueues a lobby-expiry job for the game.
    pub async fn schedule_lobby_expiry(
        &self,
        game: GameId,
        delay: Duration,
    ) -> Result<JobId, GameError> {
        let job = self
            .queue
            .schedule(LOBBY_EXPIRY_JOB, json!({ "game_id": game.0 }), delay)
            .await?;
        tracing::debug!(%game, %job, ?delay, "lobby expiry scheduled");
        Ok(job)
    }

    /// Enqueues a turn-expiry job for the occupant.
    pub async fn schedule_turn_expiry(
        &self,
        player: PlayerId,
        delay: Duration,
    ) -> Result<JobId, GameError> {
        let job = self
            .queue
            .schedule(TURN_EXPIRY_JOB, json!({ "player_id": player.0 }), delay)
            .await?;
        tracing::debug!(%player, %job, ?delay, "turn expiry scheduled");
        Ok(job)
    }

    /// Cancels a job handle if one is live. Idempotent: `None` and
    /// "already gone" are both success. Cancelling a job that already
    /// began executing does not suppress its handler — handlers
    /// re-validate their preconditions instead.
    pub async fn cancel(&self, job: Option<JobId>) -> Result<(), GameError> {
        if let Some(job) = job {
            let removed = self.queue.cancel(job).await?;
            tracing::debug!(%job, removed, "expiry job cancelled");
        }
        Ok(())
    }
}
