//! Lifecycle state machines for games and players.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle state of a game session.
///
/// ```text
/// Init → Lobby → Running → Ended
///          └───────────────↗ (abort / lobby expiry)
/// ```
///
/// - **Init**: the game row exists but the creator has not been seated
///   yet. Transient; never observed by other users.
/// - **Lobby**: accepting joins, waiting to fill the required seats.
/// - **Running**: turns are being taken. `current_player` is set.
/// - **Ended**: terminal. The record survives until its last active
///   player leaves, then it is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Init,
    Lobby,
    Running,
    Ended,
}

impl GameState {
    /// Returns `true` if the game is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` if turns are being taken.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns `true` if the game has reached its terminal state.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "Init"),
            Self::Lobby => write!(f, "Lobby"),
            Self::Running => write!(f, "Running"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

/// Whether a player record still occupies its seat.
///
/// A player is never deleted while its game lives; leaving a game marks
/// the record `Inactive` so the seat index stays stable and turn history
/// keeps a valid reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Active,
    Inactive,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_state_is_joinable() {
        assert!(!GameState::Init.is_joinable());
        assert!(GameState::Lobby.is_joinable());
        assert!(!GameState::Running.is_joinable());
        assert!(!GameState::Ended.is_joinable());
    }

    #[test]
    fn test_game_state_is_running() {
        assert!(GameState::Running.is_running());
        assert!(!GameState::Lobby.is_running());
    }

    #[test]
    fn test_game_state_is_over() {
        assert!(GameState::Ended.is_over());
        assert!(!GameState::Running.is_over());
    }

    #[test]
    fn test_game_state_display() {
        assert_eq!(GameState::Lobby.to_string(), "Lobby");
        assert_eq!(GameState::Running.to_string(), "Running");
    }
}
