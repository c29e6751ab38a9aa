//! In-memory reference implementation of [`GameStore`].
//!
//! Backed by plain hash maps behind a single `parking_lot::RwLock`.
//! Identifier assignment is a process-wide atomic counter, so ids are
//! unique and monotonic — "latest turn" and "oldest lobby" orderings
//! fall out of id order when creation timestamps tie.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use turnhall_model::{
    ConfigId, Game, GameConfig, GameId, GameState, Invite, InviteId, NewGameConfig,
    Player, PlayerId, PlayerState, Turn, TurnId, UserId,
};

use crate::{GameStore, Paging, StoreError};

#[derive(Default)]
struct Inner {
    configs: HashMap<ConfigId, GameConfig>,
    games: HashMap<GameId, Game>,
    players: HashMap<PlayerId, Player>,
    turns: HashMap<TurnId, Turn>,
    invites: HashMap<InviteId, Invite>,
}

/// The in-process store used by tests and single-node deployments.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    // -- Configurations ---------------------------------------------------

    async fn create_config(&self, config: NewGameConfig) -> Result<GameConfig, StoreError> {
        let stored = GameConfig {
            id: ConfigId(self.next_id()),
            slots: config.slots,
            turn_max_secs: config.turn_max_secs,
            score_modifiers: config.score_modifiers,
            type_id: config.type_id,
            created_at: Utc::now(),
        };
        self.inner.write().configs.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn config(&self, id: ConfigId) -> Result<GameConfig, StoreError> {
        self.inner
            .read()
            .configs
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("Config", id.0))
    }

    async fn update_config(&self, config: &GameConfig) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.configs.contains_key(&config.id) {
            return Err(StoreError::not_found("Config", config.id.0));
        }
        inner.configs.insert(config.id, config.clone());
        Ok(())
    }

    async fn delete_config(&self, id: ConfigId) -> Result<(), StoreError> {
        self.inner.write().configs.remove(&id);
        Ok(())
    }

    // -- Games ------------------------------------------------------------

    async fn create_game(&self, config: ConfigId, creator: UserId) -> Result<Game, StoreError> {
        let game = Game {
            id: GameId(self.next_id()),
            state: GameState::Init,
            turn: 0,
            current_player: None,
            consecutive_timeouts: 0,
            config,
            creator,
            lobby_job: None,
            turn_job: None,
            created_at: Utc::now(),
        };
        self.inner.write().games.insert(game.id, game.clone());
        tracing::debug!(game = %game.id, %creator, "game created");
        Ok(game)
    }

    async fn game(&self, id: GameId) -> Result<Game, StoreError> {
        self.inner
            .read()
            .games
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("Game", id.0))
    }

    async fn update_game(&self, game: &Game) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.games.contains_key(&game.id) {
            return Err(StoreError::not_found("Game", game.id.0));
        }
        inner.games.insert(game.id, game.clone());
        Ok(())
    }

    async fn delete_game(&self, id: GameId) -> Result<(), StoreError> {
        self.inner.write().games.remove(&id);
        tracing::debug!(game = %id, "game deleted");
        Ok(())
    }

    async fn count_games_by_creator(
        &self,
        creator: UserId,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<usize, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .games
            .values()
            .filter(|g| g.creator == creator)
            .filter(|g| created_after.is_none_or(|cutoff| g.created_at > cutoff))
            .count())
    }

    async fn find_lobby_games(
        &self,
        type_id: Option<u32>,
        paging: Paging,
    ) -> Result<Vec<Game>, StoreError> {
        let inner = self.inner.read();
        let mut games: Vec<Game> = inner
            .games
            .values()
            .filter(|g| g.state == GameState::Lobby)
            .filter(|g| {
                inner
                    .configs
                    .get(&g.config)
                    .is_some_and(|c| c.has_open_slot() && c.type_id == type_id)
            })
            .cloned()
            .collect();
        games.sort_by_key(|g| (g.created_at, g.id));
        Ok(paging.slice(games))
    }

    // -- Players ----------------------------------------------------------

    async fn create_player(
        &self,
        game: GameId,
        user: UserId,
        slot: usize,
    ) -> Result<Player, StoreError> {
        // Check-and-insert under one write lock: this is the uniqueness
        // guarantee concurrent joins race against.
        let mut inner = self.inner.write();
        let duplicate = inner
            .players
            .values()
            .any(|p| p.game == game && p.user == user && p.state == PlayerState::Active);
        if duplicate {
            return Err(StoreError::DuplicateActivePlayer { game, user });
        }
        let player = Player {
            id: PlayerId(self.next_id()),
            game,
            user,
            slot,
            state: PlayerState::Active,
            created_at: Utc::now(),
        };
        inner.players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn player(&self, id: PlayerId) -> Result<Player, StoreError> {
        self.inner
            .read()
            .players
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("Player", id.0))
    }

    async fn update_player(&self, player: &Player) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.players.contains_key(&player.id) {
            return Err(StoreError::not_found("Player", player.id.0));
        }
        inner.players.insert(player.id, player.clone());
        Ok(())
    }

    async fn delete_player(&self, id: PlayerId) -> Result<(), StoreError> {
        self.inner.write().players.remove(&id);
        Ok(())
    }

    async fn players_by_game(&self, game: GameId) -> Result<Vec<Player>, StoreError> {
        let inner = self.inner.read();
        let mut players: Vec<Player> = inner
            .players
            .values()
            .filter(|p| p.game == game)
            .cloned()
            .collect();
        players.sort_by_key(|p| p.slot);
        Ok(players)
    }

    async fn active_players_by_game(&self, game: GameId) -> Result<Vec<Player>, StoreError> {
        let inner = self.inner.read();
        let mut players: Vec<Player> = inner
            .players
            .values()
            .filter(|p| p.game == game && p.state == PlayerState::Active)
            .cloned()
            .collect();
        players.sort_by_key(|p| p.slot);
        Ok(players)
    }

    async fn find_player(
        &self,
        game: GameId,
        user: UserId,
    ) -> Result<Option<Player>, StoreError> {
        let inner = self.inner.read();
        let mut players: Vec<&Player> = inner
            .players
            .values()
            .filter(|p| p.game == game && p.user == user)
            .collect();
        // Prefer the active record when both an old inactive one and a
        // fresh active one exist for the same user.
        players.sort_by_key(|p| (p.state != PlayerState::Active, p.id));
        Ok(players.first().map(|p| (*p).clone()))
    }

    async fn find_active_player(
        &self,
        game: GameId,
        user: UserId,
    ) -> Result<Option<Player>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .players
            .values()
            .find(|p| p.game == game && p.user == user && p.state == PlayerState::Active)
            .cloned())
    }

    async fn delete_players_by_game(&self, game: GameId) -> Result<(), StoreError> {
        self.inner.write().players.retain(|_, p| p.game != game);
        Ok(())
    }

    // -- Turns ------------------------------------------------------------

    async fn create_turn(
        &self,
        game: GameId,
        player: PlayerId,
        number: u64,
        payload: String,
    ) -> Result<Turn, StoreError> {
        let turn = Turn {
            id: TurnId(self.next_id()),
            game,
            player,
            number,
            payload,
            created_at: Utc::now(),
        };
        self.inner.write().turns.insert(turn.id, turn.clone());
        Ok(turn)
    }

    async fn latest_turn(&self, game: GameId) -> Result<Option<Turn>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .turns
            .values()
            .filter(|t| t.game == game)
            .max_by_key(|t| t.id)
            .cloned())
    }

    async fn turns_by_game(
        &self,
        game: GameId,
        paging: Paging,
    ) -> Result<Vec<Turn>, StoreError> {
        let inner = self.inner.read();
        let mut turns: Vec<Turn> = inner
            .turns
            .values()
            .filter(|t| t.game == game)
            .cloned()
            .collect();
        turns.sort_by_key(|t| std::cmp::Reverse(t.id));
        Ok(paging.slice(turns))
    }

    async fn delete_turns_by_game(&self, game: GameId) -> Result<(), StoreError> {
        self.inner.write().turns.retain(|_, t| t.game != game);
        Ok(())
    }

    // -- Invites ----------------------------------------------------------

    async fn invite_by_inviter(
        &self,
        inviter: PlayerId,
    ) -> Result<Option<Invite>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .invites
            .values()
            .find(|i| i.inviter == inviter)
            .cloned())
    }

    async fn create_invite(
        &self,
        inviter: PlayerId,
        token: String,
    ) -> Result<Invite, StoreError> {
        let invite = Invite {
            id: InviteId(self.next_id()),
            inviter,
            token,
            created_at: Utc::now(),
        };
        self.inner.write().invites.insert(invite.id, invite.clone());
        Ok(invite)
    }

    async fn delete_invites_by_inviters(
        &self,
        inviters: &[PlayerId],
    ) -> Result<(), StoreError> {
        self.inner
            .write()
            .invites
            .retain(|_, i| !inviters.contains(&i.inviter));
        Ok(())
    }
}
