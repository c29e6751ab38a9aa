//! Outbound notification seam.
//!
//! Delivery is fire-and-forget from the lifecycle's perspective:
//! implementations log failures and never block a transition. Rendering
//! a [`Notice`] into localized copy is the transport adapter's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use turnhall_model::{GameId, UserId};

/// A structured push message and its interpolation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    /// The game left the lobby and the first turn is pending.
    GameStarted { game: GameId },
    /// A final turn ended the game.
    GameEnded { game: GameId },
    /// The creator abandoned the lobby.
    GameAborted { game: GameId },
    /// The lobby expired before enough players joined.
    LobbyExpired { game: GameId },
    /// The game ran out of active turns and was terminated.
    InactivityEnded { game: GameId },
    /// The recipient is the new current occupant.
    YourTurn { game: GameId },
    /// The recipient was invited; `link` is the stable join URL.
    Invited { game: GameId, link: String },
}

/// Pushes notices to a set of recipients.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `notice` to every recipient, best effort.
    async fn notify(&self, recipients: &[UserId], notice: Notice);
}

/// Default notifier: writes each notice to the log and delivers nothing.
///
/// Useful in tests and for deployments that haven't wired a push
/// transport yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipients: &[UserId], notice: Notice) {
        tracing::info!(?recipients, ?notice, "notice");
    }
}
