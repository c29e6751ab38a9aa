//! The [`GameStore`] trait: every query and mutation the core performs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use turnhall_model::{
    ConfigId, Game, GameConfig, GameId, Invite, NewGameConfig, Player, PlayerId,
    Turn, UserId,
};

use crate::{Paging, StoreError};

/// Async CRUD plus the filtered/sorted/paged queries in the data model.
///
/// All operations run with elevated access; row-level permissions are an
/// adapter concern. Implementations must return
/// [`StoreError::NotFound`] for missing identifiers and must enforce the
/// active-player uniqueness invariant inside [`create_player`]
/// (atomically relative to concurrent calls — a conditional insert or a
/// uniqueness constraint).
///
/// [`create_player`]: GameStore::create_player
#[async_trait]
pub trait GameStore: Send + Sync {
    // -- Configurations ---------------------------------------------------

    /// Persists a new configuration and assigns its identifier.
    async fn create_config(&self, config: NewGameConfig) -> Result<GameConfig, StoreError>;

    async fn config(&self, id: ConfigId) -> Result<GameConfig, StoreError>;

    /// Overwrites a configuration (slot-kind conversions only; the rest
    /// is immutable after creation).
    async fn update_config(&self, config: &GameConfig) -> Result<(), StoreError>;

    async fn delete_config(&self, id: ConfigId) -> Result<(), StoreError>;

    // -- Games ------------------------------------------------------------

    /// Persists a new game in `Init` with a zeroed turn counter.
    async fn create_game(&self, config: ConfigId, creator: UserId) -> Result<Game, StoreError>;

    async fn game(&self, id: GameId) -> Result<Game, StoreError>;

    async fn update_game(&self, game: &Game) -> Result<(), StoreError>;

    async fn delete_game(&self, id: GameId) -> Result<(), StoreError>;

    /// Outstanding games by one creator, optionally only those created
    /// after a cutoff. Feeds the creation quota guard.
    async fn count_games_by_creator(
        &self,
        creator: UserId,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<usize, StoreError>;

    /// Lobby games whose configuration still has an open slot and whose
    /// category matches, oldest first.
    async fn find_lobby_games(
        &self,
        type_id: Option<u32>,
        paging: Paging,
    ) -> Result<Vec<Game>, StoreError>;

    // -- Players ----------------------------------------------------------

    /// Persists a new active player on the given slot.
    ///
    /// Fails with [`StoreError::DuplicateActivePlayer`] if the user
    /// already holds an active player in this game. This check-and-insert
    /// is the one atomicity guarantee concurrent joins rely on.
    async fn create_player(
        &self,
        game: GameId,
        user: UserId,
        slot: usize,
    ) -> Result<Player, StoreError>;

    async fn player(&self, id: PlayerId) -> Result<Player, StoreError>;

    async fn update_player(&self, player: &Player) -> Result<(), StoreError>;

    async fn delete_player(&self, id: PlayerId) -> Result<(), StoreError>;

    /// All players of a game, any state, ordered by slot.
    async fn players_by_game(&self, game: GameId) -> Result<Vec<Player>, StoreError>;

    /// Active players of a game, ordered by slot.
    async fn active_players_by_game(&self, game: GameId) -> Result<Vec<Player>, StoreError>;

    /// The user's player in a game regardless of state, if any.
    async fn find_player(&self, game: GameId, user: UserId)
        -> Result<Option<Player>, StoreError>;

    /// The user's active player in a game, if any.
    async fn find_active_player(
        &self,
        game: GameId,
        user: UserId,
    ) -> Result<Option<Player>, StoreError>;

    async fn delete_players_by_game(&self, game: GameId) -> Result<(), StoreError>;

    // -- Turns ------------------------------------------------------------

    async fn create_turn(
        &self,
        game: GameId,
        player: PlayerId,
        number: u64,
        payload: String,
    ) -> Result<Turn, StoreError>;

    /// The most recently created turn of a game, if any.
    async fn latest_turn(&self, game: GameId) -> Result<Option<Turn>, StoreError>;

    /// Turns of a game, newest first.
    async fn turns_by_game(&self, game: GameId, paging: Paging)
        -> Result<Vec<Turn>, StoreError>;

    async fn delete_turns_by_game(&self, game: GameId) -> Result<(), StoreError>;

    // -- Invites ----------------------------------------------------------

    async fn invite_by_inviter(&self, inviter: PlayerId)
        -> Result<Option<Invite>, StoreError>;

    async fn create_invite(&self, inviter: PlayerId, token: String)
        -> Result<Invite, StoreError>;

    async fn delete_invites_by_inviters(&self, inviters: &[PlayerId])
        -> Result<(), StoreError>;
}
