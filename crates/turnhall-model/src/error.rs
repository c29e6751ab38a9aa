//! Validation errors for seat configurations.

/// Why a [`NewGameConfig`](crate::NewGameConfig) was rejected.
///
/// Raised by explicit validation before anything is persisted; a rejected
/// configuration leaves no state behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Exactly one creator slot must be present.
    #[error("expected exactly one creator slot, found {0}")]
    CreatorSlotCount(usize),

    /// The slot list exceeds the configured maximum.
    #[error("too many slots: {count} exceeds the maximum of {max}")]
    TooManySlots { count: usize, max: usize },

    /// An invite slot has no resolved target user.
    #[error("invite slot {0} has no target user")]
    UnresolvedInvite(usize),

    /// A computer-controlled slot has no difficulty.
    #[error("ai slot {0} has no difficulty")]
    MissingDifficulty(usize),

    /// The turn time limit must be at least one second.
    #[error("turn time limit must be at least 1 second")]
    ZeroTurnTimeout,
}
