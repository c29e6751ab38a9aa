//! The persisted entities: games, players, turns, and invites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ConfigId, GameId, InviteId, JobId, PlayerId, TurnId, UserId};
use crate::state::{GameState, PlayerState};

/// One game session.
///
/// Invariants maintained by the session layer:
/// - `current_player` is `Some` iff `state == Running`.
/// - `turn` never decreases.
/// - At most one live `lobby_job` and one live `turn_job` exist at any
///   instant; the previous handle is cancelled before a new one is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub state: GameState,
    /// Monotonically increasing turn counter. A [`Turn`] records the
    /// counter value at the moment it was created, before the advance.
    pub turn: u64,
    pub current_player: Option<PlayerId>,
    /// Back-to-back auto-advanced turns. Reset to zero by any manually
    /// submitted turn; compared against the inactivity limit to detect a
    /// fully abandoned game.
    pub consecutive_timeouts: u32,
    pub config: ConfigId,
    pub creator: UserId,
    /// Handle of the pending lobby-expiry job, if one is live.
    pub lobby_job: Option<JobId>,
    /// Handle of the pending turn-expiry job, if one is live.
    pub turn_job: Option<JobId>,
    pub created_at: DateTime<Utc>,
}

/// One user's occupancy of one slot in one game.
///
/// The slot index is stable once assigned: leaving marks the record
/// `Inactive`, it never moves. The store guarantees at most one `Active`
/// player per `(game, user)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub game: GameId,
    pub user: UserId,
    pub slot: usize,
    pub state: PlayerState,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn is_active(&self) -> bool {
        self.state == PlayerState::Active
    }
}

/// An immutable record of one move.
///
/// `number` is the game's turn counter at creation time; numbers within
/// a game are non-decreasing in creation order. The payload is opaque to
/// the lifecycle and non-empty for manual turns; an auto-cloned turn in
/// a game with no history yet carries an empty payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub game: GameId,
    pub player: PlayerId,
    pub number: u64,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

/// A stable join-link target for one inviter.
///
/// Created lazily the first time the inviter asks for a link and reused
/// afterwards, so a shared link keeps working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: InviteId,
    pub inviter: PlayerId,
    /// Random 32-character hex token appended to the invite URL prefix.
    pub token: String,
    pub created_at: DateTime<Utc>,
}
