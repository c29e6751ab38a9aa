//! Core entity types for Turnhall.
//!
//! Everything the rest of the workspace persists, queries, or passes across
//! crate boundaries is defined here: identifiers, lifecycle states, the seat
//! configuration with its validation rules, and the stored entities
//! themselves. This crate is deliberately free of I/O — the store and
//! session layers depend on it, never the other way around.

mod config;
mod entities;
mod error;
mod ids;
mod state;

pub use config::{AiDifficulty, GameConfig, NewGameConfig, Slot, SlotKind, MAX_SLOTS};
pub use entities::{Game, Invite, Player, Turn};
pub use error::ConfigError;
pub use ids::{ConfigId, GameId, InviteId, JobId, PlayerId, TurnId, UserId};
pub use state::{GameState, PlayerState};
