//! Job handlers bridging the queue to the lifecycle's expiry entry
//! points.
//!
//! The handlers only parse the payload and delegate; all precondition
//! re-validation lives in [`GameService`]. A service-level error bubbles
//! back to the queue as a failed attempt and is retried there.

use std::sync::Arc;

use async_trait::async_trait;
use turnhall_jobs::{JobError, JobHandler, TokioJobQueue};
use turnhall_model::{GameId, PlayerId};

use crate::scheduler::{LOBBY_EXPIRY_JOB, TURN_EXPIRY_JOB};
use crate::GameService;

/// Handles `"game lobby expiry"` jobs.
pub struct LobbyExpiryHandler {
    service: Arc<GameService>,
}

impl LobbyExpiryHandler {
    pub fn new(service: Arc<GameService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl JobHandler for LobbyExpiryHandler {
    async fn run(&self, payload: serde_json::Value) -> Result<(), JobError> {
        let game_id = payload
            .get("game_id")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| JobError::new("lobby expiry payload missing game_id"))?;
        self.service
            .handle_lobby_expiry(GameId(game_id))
            .await
            .map_err(|error| JobError::new(error.to_string()))
    }
}

/// Handles `"game turn expiry"` jobs.
pub struct TurnExpiryHandler {
    service: Arc<GameService>,
}

impl TurnExpiryHandler {
    pub fn new(service: Arc<GameService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl JobHandler for TurnExpiryHandler {
    async fn run(&self, payload: serde_json::Value) -> Result<(), JobError> {
        let player_id = payload
            .get("player_id")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| JobError::new("turn expiry payload missing player_id"))?;
        self.service
            .handle_turn_expiry(PlayerId(player_id))
            .await
            .map_err(|error| JobError::new(error.to_string()))
    }
}

/// Registers both expiry handlers on the queue. Must run before the
/// service schedules its first job.
pub fn register_expiry_handlers(queue: &TokioJobQueue, service: &Arc<GameService>) {
    queue.register(
        LOBBY_EXPIRY_JOB,
        Arc::new(LobbyExpiryHandler::new(service.clone())),
    );
    queue.register(
        TURN_EXPIRY_JOB,
        Arc::new(TurnExpiryHandler::new(service.clone())),
    );
}
