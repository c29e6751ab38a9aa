//! Error types for game session operations.

use turnhall_jobs::QueueError;
use turnhall_model::{ConfigError, GameId, GameState};
use turnhall_store::StoreError;

/// Errors surfaced by [`GameService`](crate::GameService) operations.
///
/// Validation and precondition failures are rejected synchronously with
/// no state mutated. `Store` and `Queue` pass infrastructure failures
/// through uninterpreted.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    // -- Validation -------------------------------------------------------
    /// The submitted seat configuration broke a layout rule.
    #[error("invalid game configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Turn payloads must be non-empty strings.
    #[error("turn payload must be a non-empty string")]
    InvalidTurnPayload,

    /// The stored turn time limit is unusable.
    #[error("invalid turn timeout: {0}")]
    InvalidTimeout(u32),

    // -- Preconditions ----------------------------------------------------
    /// The game's lifecycle state does not accept the operation.
    #[error("game state {actual} does not accept this operation, expected {expected}")]
    InvalidState { expected: String, actual: GameState },

    /// The caller is not the active current occupant.
    #[error("it's not your turn")]
    NotYourTurn,

    /// The caller already holds an active seat in this game.
    #[error("player already in game")]
    AlreadyInGame,

    /// Every suitable seat is taken.
    #[error("unable to join, game is full")]
    GameFull,

    /// An over-capacity join was detected but removing the extra player
    /// failed; the game needs operator attention.
    #[error("game is too full, but unable to remove player")]
    GameFullRollback(#[source] StoreError),

    /// The caller has no active seat in this game.
    #[error("player not in game")]
    PlayerNotInGame,

    /// A running game unexpectedly has no current occupant.
    #[error("unable to find next player, no current player")]
    NoCurrentPlayer,

    /// Only participants may operate on a game this way.
    #[error("cannot operate on a third-party game")]
    ThirdPartyGame,

    /// Manual start requested before the grace period elapsed.
    #[error("game is not startable yet")]
    NotStartableYet,

    /// Fewer than two active players are seated.
    #[error("not enough players to start the game")]
    InsufficientPlayers,

    /// The caller holds no invite for this game.
    #[error("unable to get invite")]
    InviteUnavailable,

    /// A player record points at a seat outside the configured layout.
    #[error("player slot {slot} is out of bounds for game {game}")]
    SlotOutOfBounds { game: GameId, slot: usize },

    // -- Quota ------------------------------------------------------------
    /// The creator is over one of the session caps.
    #[error("unable to create game, exceeded quota")]
    QuotaExceeded,

    // -- Infrastructure ---------------------------------------------------
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl GameError {
    /// Builds the state-precondition error with a readable expectation.
    pub(crate) fn invalid_state(expected: &[GameState], actual: GameState) -> Self {
        Self::InvalidState {
            expected: expected
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
            actual,
        }
    }
}
