//! Creation quota guard: caps how many games a creator has outstanding.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use turnhall_model::UserId;
use turnhall_store::GameStore;

use crate::{GameError, ServiceConfig};

/// Two independent caps consulted before any game is created: a hard
/// total on outstanding games per creator, and a cap on games created
/// within a trailing window.
///
/// Enforcement is best effort relative to the creation it guards — two
/// concurrent creations may briefly overshoot by one, which is
/// acceptable; exact enforcement is not required.
pub struct QuotaGuard {
    store: Arc<dyn GameStore>,
    total_limit: usize,
    recent_limit: usize,
    recent_window: Duration,
}

impl QuotaGuard {
    pub fn new(store: Arc<dyn GameStore>, config: &ServiceConfig) -> Self {
        Self {
            store,
            total_limit: config.game_limit_total,
            recent_limit: config.game_limit_recent,
            recent_window: config.recent_window,
        }
    }

    /// Returns `Err(QuotaExceeded)` if either cap would be exceeded by
    /// one more creation.
    pub async fn check(&self, creator: UserId) -> Result<(), GameError> {
        let total = self.store.count_games_by_creator(creator, None).await?;
        if total >= self.total_limit {
            tracing::info!(%creator, total, limit = self.total_limit, "total game quota hit");
            return Err(GameError::QuotaExceeded);
        }

        let cutoff = Utc::now() - self.recent_window;
        let recent = self
            .store
            .count_games_by_creator(creator, Some(cutoff))
            .await?;
        if recent >= self.recent_limit {
            tracing::info!(%creator, recent, limit = self.recent_limit, "recent game quota hit");
            return Err(GameError::QuotaExceeded);
        }

        Ok(())
    }
}
