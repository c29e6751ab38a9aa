//! # Turnhall
//!
//! Backend for turn-based multiplayer game sessions: players gather in
//! a lobby, the creator (or a filled table) starts the match, players
//! take turns in rotation, and the game terminates by completion,
//! abandonment, or inactivity — with time limits enforced through
//! cancellable delayed jobs.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use turnhall::prelude::*;
//!
//! # async fn run() -> Result<(), GameError> {
//! let hall = Turnhall::builder().build();
//!
//! let creator = UserId(1);
//! let config = NewGameConfig {
//!     slots: vec![Slot::creator(), Slot::open()],
//!     ..NewGameConfig::default()
//! };
//! let created = hall.service().create_game(creator, config).await?;
//! hall.service().join_game(UserId(2), created.game.id).await?;
//! hall.service()
//!     .submit_turn(creator, created.game.id, "opening move", false)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! The builder wires a [`GameService`](turnhall_session::GameService)
//! to a store, a job queue with the two expiry handlers registered, and
//! a notifier. By default that is the in-memory store and the logging
//! notifier; production deployments inject their own implementations of
//! the [`GameStore`](turnhall_store::GameStore) and
//! [`Notifier`](turnhall_session::Notifier) seams.

mod builder;

pub use builder::{Turnhall, TurnhallBuilder};

/// Initializes the process-wide tracing subscriber, reading the filter
/// from `RUST_LOG` (default `info`). Call once at startup.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// The common imports for working with Turnhall.
pub mod prelude {
    pub use turnhall_jobs::{JobQueue, QueueConfig, TokioJobQueue};
    pub use turnhall_model::{
        AiDifficulty, Game, GameConfig, GameId, GameState, Invite, NewGameConfig,
        Player, PlayerId, PlayerState, Slot, SlotKind, Turn, UserId,
    };
    pub use turnhall_session::{
        GameError, GameInfo, GameService, LogNotifier, Notice, Notifier, ServiceConfig,
    };
    pub use turnhall_store::{GameStore, MemoryStore, Paging};

    pub use crate::{Turnhall, TurnhallBuilder};
}
