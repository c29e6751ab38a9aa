//! Error types for the store seam.

use turnhall_model::{GameId, UserId};

/// Errors a [`GameStore`](crate::GameStore) implementation can return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No entity of the named kind exists under the given identifier.
    /// Callers match on this to distinguish "gone" from "broken".
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// The active-player uniqueness invariant would be violated.
    /// Surfaced to the loser of a concurrent duplicate join.
    #[error("user {user} already has an active player in game {game}")]
    DuplicateActivePlayer { game: GameId, user: UserId },

    /// The backing store is unreachable or failed mid-operation.
    /// Propagated to the caller uninterpreted.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Returns `true` for the distinguishable "missing identifier" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
