//! Session lifecycle for Turnhall.
//!
//! This crate is the core of the system: the state machine that moves a
//! game through `Init → Lobby → Running → Ended`, assigns and converts
//! seats, rotates the turn order, and enforces time limits through
//! cancellable delayed jobs.
//!
//! # Key types
//!
//! - [`GameService`] — the orchestrator; one method per external event
//! - [`next_occupant`] — the pure turn-rotation function
//! - [`TimeoutScheduler`] — schedules/cancels the two expiry job kinds
//! - [`QuotaGuard`] — per-creator caps consulted before creation
//! - [`Notifier`] / [`Notice`] — the outbound push seam
//! - [`register_expiry_handlers`] — wires the job queue back into the
//!   service's expiry entry points

mod config;
mod error;
mod handlers;
mod notify;
mod quota;
mod rotation;
mod scheduler;
mod service;

pub use config::ServiceConfig;
pub use error::GameError;
pub use handlers::{register_expiry_handlers, LobbyExpiryHandler, TurnExpiryHandler};
pub use notify::{LogNotifier, Notice, Notifier};
pub use quota::QuotaGuard;
pub use rotation::next_occupant;
pub use scheduler::{TimeoutScheduler, LOBBY_EXPIRY_JOB, TURN_EXPIRY_JOB};
pub use service::{GameInfo, GameService};
