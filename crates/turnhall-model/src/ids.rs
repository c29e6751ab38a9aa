//! Identifier newtypes for every persisted entity.
//!
//! Wrapping the raw `u64` in a named struct keeps a `GameId` from being
//! passed where a `PlayerId` is expected, and gives logs a readable
//! short prefix per entity (`G-42`, `P-7`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

id_type!(
    /// A unique identifier for a game session.
    GameId, "G"
);
id_type!(
    /// A unique identifier for a user (resolved by the identity provider).
    UserId, "U"
);
id_type!(
    /// A unique identifier for a player record (one user's seat in one game).
    PlayerId, "P"
);
id_type!(
    /// A unique identifier for a turn record.
    TurnId, "T"
);
id_type!(
    /// A unique identifier for a game configuration.
    ConfigId, "C"
);
id_type!(
    /// A unique identifier for an invite link target.
    InviteId, "I"
);
id_type!(
    /// A handle to a scheduled delayed job, assigned by the job queue.
    JobId, "J"
);
