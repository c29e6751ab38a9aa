//! The session lifecycle state machine.
//!
//! [`GameService`] owns every transition a game can make:
//!
//! ```text
//! create ──→ Init ──(creator seated)──→ Lobby ──(last seat filled /
//!            lobby expiry with 2+)──→ Running ──(final turn, rotation
//!            exhausted, inactivity)──→ Ended ──(last active player
//!            leaves)──→ destroyed
//! ```
//!
//! Each public method is one external event and may run concurrently
//! with the others; correctness rests on the store's active-player
//! uniqueness check, idempotent job cancellation, and the expiry
//! handlers re-validating their preconditions before acting.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use turnhall_jobs::JobQueue;
use turnhall_model::{
    Game, GameConfig, GameId, GameState, Invite, NewGameConfig, Player, PlayerId,
    PlayerState, SlotKind, Turn, UserId,
};
use turnhall_store::{GameStore, Paging, StoreError};

use crate::notify::{Notice, Notifier};
use crate::quota::QuotaGuard;
use crate::rotation;
use crate::scheduler::TimeoutScheduler;
use crate::{GameError, ServiceConfig};

/// The result of an operation that seats or re-reads a player.
#[derive(Debug, Clone)]
pub struct GameInfo {
    pub game: Game,
    pub player: Player,
    /// Active players seated after the operation.
    pub player_count: usize,
}

/// Orchestrates the session lifecycle against the store, the timeout
/// scheduler, and the notifier.
///
/// Constructed once per process and shared behind an `Arc`; every
/// external event is handled by an independent call, there is no global
/// lock.
pub struct GameService {
    store: Arc<dyn GameStore>,
    scheduler: TimeoutScheduler,
    notifier: Arc<dyn Notifier>,
    quota: QuotaGuard,
    config: ServiceConfig,
}

impl GameService {
    pub fn new(
        store: Arc<dyn GameStore>,
        queue: Arc<dyn JobQueue>,
        notifier: Arc<dyn Notifier>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            quota: QuotaGuard::new(store.clone(), &config),
            scheduler: TimeoutScheduler::new(queue),
            store,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // =====================================================================
    // Creation
    // =====================================================================

    /// Creates a game: quota check, configuration validation, persist,
    /// seat the creator, open the lobby, notify invitees.
    ///
    /// Any failure after the game row exists unwinds by destroying the
    /// partial game (and its configuration) and re-raising the original
    /// error. A rollback failure replaces the original error; both are
    /// logged.
    pub async fn create_game(
        &self,
        creator: UserId,
        mut new_config: NewGameConfig,
    ) -> Result<GameInfo, GameError> {
        self.quota.check(creator).await?;
        if new_config.turn_max_secs == 0 {
            new_config.turn_max_secs = self.config.default_turn_max_secs;
        }
        new_config.validate(self.config.max_slots)?;

        let config = self.store.create_config(new_config).await?;
        let game = match self.store.create_game(config.id, creator).await {
            Ok(game) => game,
            Err(error) => {
                let _ = self.store.delete_config(config.id).await;
                return Err(error.into());
            }
        };

        match self.finish_creation(game.clone(), &config, creator).await {
            Ok(info) => Ok(info),
            Err(error) => {
                tracing::warn!(game = %game.id, %error, "game creation failed, rolling back");
                let latest = self.store.game(game.id).await.unwrap_or(game);
                match self.destroy_game(&latest).await {
                    Ok(()) => Err(error),
                    Err(rollback) => {
                        tracing::error!(
                            original = %error,
                            %rollback,
                            "rollback of failed game creation also failed"
                        );
                        Err(rollback)
                    }
                }
            }
        }
    }

    /// Seats the creator, schedules the lobby expiry, and moves the game
    /// from `Init` to `Lobby`.
    async fn finish_creation(
        &self,
        mut game: Game,
        config: &GameConfig,
        creator: UserId,
    ) -> Result<GameInfo, GameError> {
        let player = self.seat_player(&game, config, creator).await?;

        let lobby_job = self
            .scheduler
            .schedule_lobby_expiry(game.id, self.config.lobby_expiry)
            .await?;
        game.state = GameState::Lobby;
        game.current_player = None;
        game.lobby_job = Some(lobby_job);
        self.store.update_game(&game).await?;
        tracing::info!(game = %game.id, %creator, "game created, lobby open");

        let invitees: Vec<UserId> = config
            .slots
            .iter()
            .filter(|slot| slot.kind == SlotKind::Invite)
            .filter_map(|slot| slot.user)
            .collect();
        if !invitees.is_empty() {
            let invite = self.invite_for(&player).await?;
            let link = self.invite_link(&invite);
            self.notifier
                .notify(&invitees, Notice::Invited { game: game.id, link })
                .await;
        }

        Ok(GameInfo { game, player, player_count: 1 })
    }

    // =====================================================================
    // Joining and starting
    // =====================================================================

    /// Seats the caller in a lobby. Reserved seats (creator, invite) win
    /// over open seats. Filling the last required seat starts the game.
    pub async fn join_game(&self, user: UserId, game_id: GameId) -> Result<GameInfo, GameError> {
        let mut game = self.store.game(game_id).await?;
        self.require_state(&game, &[GameState::Lobby])?;
        let config = self.store.config(game.config).await?;

        let player = self.seat_player(&game, &config, user).await?;
        let player_count = self.store.active_players_by_game(game.id).await?.len();

        let required = config.player_num();
        if player_count > required {
            // Lost a race for the last seat: undo the insert and report
            // the game as full.
            if let Err(rollback) = self.store.delete_player(player.id).await {
                return Err(GameError::GameFullRollback(rollback));
            }
            return Err(GameError::GameFull);
        }

        tracing::info!(
            game = %game.id,
            %user,
            slot = player.slot,
            player_count,
            required,
            "player joined"
        );

        if player_count == required {
            self.start_game(&mut game, &config).await?;
        }

        Ok(GameInfo { game, player, player_count })
    }

    /// Finds the caller's seat: their reserved slot if one exists,
    /// otherwise the first unoccupied open slot.
    async fn seat_player(
        &self,
        game: &Game,
        config: &GameConfig,
        user: UserId,
    ) -> Result<Player, GameError> {
        let reserved = config.slots.iter().position(|slot| match slot.kind {
            SlotKind::Creator => user == game.creator,
            SlotKind::Invite => slot.user == Some(user),
            _ => false,
        });

        let slot_index = match reserved {
            Some(index) => index,
            None => {
                let active = self.store.active_players_by_game(game.id).await?;
                let occupied: HashSet<usize> = active.iter().map(|p| p.slot).collect();
                config
                    .slots
                    .iter()
                    .enumerate()
                    .position(|(index, slot)| {
                        slot.kind == SlotKind::Open && !occupied.contains(&index)
                    })
                    .ok_or(GameError::GameFull)?
            }
        };

        match self.store.create_player(game.id, user, slot_index).await {
            Ok(player) => Ok(player),
            Err(StoreError::DuplicateActivePlayer { .. }) => Err(GameError::AlreadyInGame),
            Err(error) => Err(error.into()),
        }
    }

    /// Moves a lobby to `Running`: cancel the lobby expiry, pick the
    /// lowest-slot active player as occupant, notify everyone, schedule
    /// the first turn expiry.
    async fn start_game(&self, game: &mut Game, config: &GameConfig) -> Result<(), GameError> {
        self.require_state(game, &[GameState::Lobby])?;

        self.scheduler.cancel(game.lobby_job.take()).await?;

        let active = self.store.active_players_by_game(game.id).await?;
        let occupant = active
            .first()
            .cloned()
            .ok_or(GameError::InsufficientPlayers)?;

        game.current_player = Some(occupant.id);
        game.state = GameState::Running;
        self.store.update_game(game).await?;
        tracing::info!(game = %game.id, occupant = %occupant.id, "game started");

        let users = self.game_users(game.id).await?;
        self.notifier
            .notify(&users, Notice::GameStarted { game: game.id })
            .await;

        self.prepare_turn(game, &occupant, config).await
    }

    /// Creator-requested start, allowed after the grace period with at
    /// least two active players seated.
    pub async fn start_game_manual(
        &self,
        user: UserId,
        game_id: GameId,
    ) -> Result<GameInfo, GameError> {
        let mut game = self.store.game(game_id).await?;
        if game.creator != user {
            return Err(GameError::ThirdPartyGame);
        }
        let player = self
            .store
            .find_player(game.id, user)
            .await?
            .ok_or(GameError::ThirdPartyGame)?;
        self.require_state(&game, &[GameState::Lobby])?;

        if Utc::now() < game.created_at + self.config.manual_start_grace {
            return Err(GameError::NotStartableYet);
        }

        let player_count = self.store.active_players_by_game(game.id).await?.len();
        if player_count < 2 {
            return Err(GameError::InsufficientPlayers);
        }

        let config = self.store.config(game.config).await?;
        self.start_game(&mut game, &config).await?;

        Ok(GameInfo { game, player, player_count })
    }

    // =====================================================================
    // Turns
    // =====================================================================

    /// Records a turn by the current occupant and rotates — or ends the
    /// game when the submission is marked final.
    pub async fn submit_turn(
        &self,
        user: UserId,
        game_id: GameId,
        payload: &str,
        last: bool,
    ) -> Result<Turn, GameError> {
        let mut game = self.store.game(game_id).await?;
        self.require_state(&game, &[GameState::Running])?;

        let occupant_id = game.current_player.ok_or(GameError::NotYourTurn)?;
        let occupant = self.store.player(occupant_id).await?;
        if occupant.user != user || !occupant.is_active() {
            return Err(GameError::NotYourTurn);
        }

        if payload.is_empty() {
            return Err(GameError::InvalidTurnPayload);
        }

        let turn = self
            .store
            .create_turn(game.id, occupant.id, game.turn, payload.to_string())
            .await?;
        // A manual turn resets the abandonment clock.
        game.consecutive_timeouts = 0;

        self.advance(&mut game, last).await?;

        tracing::info!(
            game = %game.id,
            player = %occupant.id,
            number = turn.number,
            last,
            "turn submitted"
        );

        if game.state.is_over() {
            let users = self.game_users(game.id).await?;
            self.notifier
                .notify(&users, Notice::GameEnded { game: game.id })
                .await;
        }

        Ok(turn)
    }

    /// Turns of a game for one of its participants, newest first.
    pub async fn list_turns(
        &self,
        user: UserId,
        game_id: GameId,
        paging: Paging,
    ) -> Result<Vec<Turn>, GameError> {
        let game = self.store.game(game_id).await?;
        self.store
            .find_player(game.id, user)
            .await?
            .ok_or(GameError::ThirdPartyGame)?;
        self.require_state(&game, &[GameState::Running, GameState::Ended])?;
        Ok(self.store.turns_by_game(game.id, paging).await?)
    }

    /// Increments the turn counter and hands the game to the next
    /// occupant (or ends it). Cancels the previous turn-expiry job and,
    /// unless the game ended, schedules the next one.
    async fn advance(&self, game: &mut Game, final_turn: bool) -> Result<(), GameError> {
        let next = if final_turn {
            None
        } else {
            let current_id = game.current_player.ok_or(GameError::NoCurrentPlayer)?;
            let current = self.store.player(current_id).await?;
            let active = self.store.active_players_by_game(game.id).await?;
            rotation::next_occupant(current.id, current.slot, &active).cloned()
        };

        game.turn += 1;
        game.current_player = next.as_ref().map(|p| p.id);
        self.scheduler.cancel(game.turn_job.take()).await?;
        if game.current_player.is_none() {
            game.state = GameState::Ended;
        }
        self.store.update_game(game).await?;

        if let Some(occupant) = next {
            let config = self.store.config(game.config).await?;
            self.prepare_turn(game, &occupant, &config).await?;
        }
        Ok(())
    }

    /// Tells the occupant it is their turn and arms the turn-expiry job.
    /// The previous handle is always cancelled before the new one is
    /// stored, keeping at most one live per game.
    async fn prepare_turn(
        &self,
        game: &mut Game,
        occupant: &Player,
        config: &GameConfig,
    ) -> Result<(), GameError> {
        if config.turn_max_secs == 0 {
            return Err(GameError::InvalidTimeout(config.turn_max_secs));
        }

        self.notifier
            .notify(&[occupant.user], Notice::YourTurn { game: game.id })
            .await;

        self.scheduler.cancel(game.turn_job.take()).await?;
        let job = self
            .scheduler
            .schedule_turn_expiry(
                occupant.id,
                Duration::from_secs(u64::from(config.turn_max_secs)),
            )
            .await?;
        game.turn_job = Some(job);
        self.store.update_game(game).await?;
        Ok(())
    }

    /// Appends a copy of the game's latest turn under `player`, so every
    /// rotation step leaves a turn behind even when nobody acted. An
    /// empty payload stands in when the game has no turns yet.
    async fn clone_last_turn(&self, game: &Game, player: &Player) -> Result<Turn, GameError> {
        let payload = self
            .store
            .latest_turn(game.id)
            .await?
            .map(|turn| turn.payload)
            .unwrap_or_default();
        Ok(self
            .store
            .create_turn(game.id, player.id, game.turn, payload)
            .await?)
    }

    // =====================================================================
    // Leaving
    // =====================================================================

    /// Marks the caller's player inactive and repairs the game around
    /// the hole: the creator abandoning a lobby aborts it, a leaver's
    /// seat re-opens (lobby) or goes to the computer (running), and a
    /// departing occupant's last turn is cloned before rotation moves
    /// on. An ended game with no active players left is destroyed.
    pub async fn leave_game(&self, user: UserId, game_id: GameId) -> Result<Player, GameError> {
        let mut game = self.store.game(game_id).await?;
        self.require_state(
            &game,
            &[GameState::Lobby, GameState::Running, GameState::Ended],
        )?;
        let leaver = self
            .store
            .find_active_player(game.id, user)
            .await?
            .ok_or(GameError::PlayerNotInGame)?;

        self.drop_player(&mut game, leaver).await
    }

    /// Shared by [`leave_game`](Self::leave_game) and the lobby-abort
    /// path. `leaver` must be the caller's active player.
    async fn drop_player(&self, game: &mut Game, mut leaver: Player) -> Result<Player, GameError> {
        leaver.state = PlayerState::Inactive;

        let occupant_left = game.current_player == Some(leaver.id);
        let aborted = game.state == GameState::Lobby && game.creator == leaver.user;
        let finished = game.state.is_over();

        if aborted {
            game.state = GameState::Ended;
            self.scheduler.cancel(game.lobby_job.take()).await?;
            let users = self.game_users(game.id).await?;
            self.notifier
                .notify(&users, Notice::GameAborted { game: game.id })
                .await;
            tracing::info!(game = %game.id, "lobby aborted by creator");
        } else if !finished {
            let mut config = self.store.config(game.config).await?;
            let slot = config.slots.get_mut(leaver.slot).ok_or(
                GameError::SlotOutOfBounds { game: game.id, slot: leaver.slot },
            )?;
            if game.state == GameState::Lobby {
                slot.kind = SlotKind::Open;
                slot.user = None;
            } else {
                slot.kind = SlotKind::Ai;
            }
            self.store.update_config(&config).await?;
        }

        self.store.update_player(&leaver).await?;

        if occupant_left && !aborted {
            self.clone_last_turn(game, &leaver).await?;
            self.advance(game, false).await?;
        } else {
            self.store.update_game(game).await?;
        }

        tracing::info!(
            game = %game.id,
            player = %leaver.id,
            state = %game.state,
            "player left"
        );

        if game.state.is_over() {
            let active = self.store.active_players_by_game(game.id).await?;
            if active.is_empty() {
                self.destroy_game(game).await?;
            }
        }

        Ok(leaver)
    }

    /// Cascade-deletes a game: both expiry jobs, invites, players,
    /// turns, configuration, and finally the game row itself.
    async fn destroy_game(&self, game: &Game) -> Result<(), GameError> {
        self.scheduler.cancel(game.lobby_job).await?;
        self.scheduler.cancel(game.turn_job).await?;

        let players = self.store.players_by_game(game.id).await?;
        let inviters: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        self.store.delete_invites_by_inviters(&inviters).await?;
        self.store.delete_players_by_game(game.id).await?;
        self.store.delete_turns_by_game(game.id).await?;
        self.store.delete_config(game.config).await?;
        self.store.delete_game(game.id).await?;
        tracing::info!(game = %game.id, "game destroyed");
        Ok(())
    }

    // =====================================================================
    // Expiry handlers
    // =====================================================================

    /// Entry point of the lobby-expiry job.
    ///
    /// Re-validates that the game still exists and is still a lobby —
    /// a stale fire is absorbed silently. With fewer than two active
    /// players the lobby times out; otherwise the game starts as if the
    /// last seat had been filled.
    pub async fn handle_lobby_expiry(&self, game_id: GameId) -> Result<(), GameError> {
        let mut game = match self.store.game(game_id).await {
            Ok(game) => game,
            Err(error) if error.is_not_found() => {
                tracing::debug!(game = %game_id, "lobby expiry for deleted game, skipping");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        if game.state != GameState::Lobby {
            tracing::debug!(game = %game.id, state = %game.state, "lobby expiry out of date, skipping");
            return Ok(());
        }

        let active = self.store.active_players_by_game(game.id).await?;
        if active.len() < 2 {
            let users = self.game_users(game.id).await?;
            self.notifier
                .notify(&users, Notice::LobbyExpired { game: game.id })
                .await;
            game.state = GameState::Ended;
            game.lobby_job = None;
            self.store.update_game(&game).await?;
            tracing::info!(game = %game.id, players = active.len(), "lobby expired");
        } else {
            let config = self.store.config(game.config).await?;
            self.start_game(&mut game, &config).await?;
        }
        Ok(())
    }

    /// Entry point of the turn-expiry job.
    ///
    /// Re-validates that the target player is still the current occupant
    /// of a running game; anything else means the state advanced through
    /// another path and the fire is absorbed silently. A valid expiry
    /// clones the latest turn under the occupant and rotates. When the
    /// consecutive-timeout counter reaches the inactivity limit the game
    /// ends instead of rotating further.
    pub async fn handle_turn_expiry(&self, player_id: PlayerId) -> Result<(), GameError> {
        let player = match self.store.player(player_id).await {
            Ok(player) => player,
            Err(error) if error.is_not_found() => {
                tracing::debug!(player = %player_id, "turn expiry for deleted player, skipping");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        let mut game = match self.store.game(player.game).await {
            Ok(game) => game,
            Err(error) if error.is_not_found() => {
                tracing::debug!(game = %player.game, "turn expiry for deleted game, skipping");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        if !game.state.is_running() || game.current_player != Some(player.id) {
            tracing::debug!(
                game = %game.id,
                player = %player.id,
                state = %game.state,
                "turn expiry out of date, skipping"
            );
            return Ok(());
        }

        game.consecutive_timeouts += 1;
        let config = self.store.config(game.config).await?;
        let limit = self.config.inactivity_limit(config.player_num());
        if game.consecutive_timeouts >= limit {
            self.scheduler.cancel(game.turn_job.take()).await?;
            game.state = GameState::Ended;
            game.current_player = None;
            self.store.update_game(&game).await?;
            let users = self.game_users(game.id).await?;
            self.notifier
                .notify(&users, Notice::InactivityEnded { game: game.id })
                .await;
            tracing::info!(
                game = %game.id,
                timeouts = game.consecutive_timeouts,
                limit,
                "game ended for total inactivity"
            );
            return Ok(());
        }

        self.clone_last_turn(&game, &player).await?;
        self.advance(&mut game, false).await?;
        tracing::info!(
            game = %game.id,
            player = %player.id,
            timeouts = game.consecutive_timeouts,
            "turn timed out, occupant advanced"
        );
        Ok(())
    }

    // =====================================================================
    // Invites and listings
    // =====================================================================

    /// Finds or lazily creates the caller's invite for a game and
    /// returns it with its join link. The invite is reused on repeat
    /// calls so shared links stay stable.
    pub async fn get_invite(
        &self,
        user: UserId,
        game_id: GameId,
    ) -> Result<(Invite, String), GameError> {
        let game = self.store.game(game_id).await?;
        let player = self
            .store
            .find_player(game.id, user)
            .await?
            .ok_or(GameError::PlayerNotInGame)?;
        let invite = self.invite_for(&player).await?;
        let link = self.invite_link(&invite);
        Ok((invite, link))
    }

    /// Converts the caller's reserved invite seat back to an open one.
    pub async fn decline_invite(&self, user: UserId, game_id: GameId) -> Result<(), GameError> {
        let game = self.store.game(game_id).await?;
        self.require_state(&game, &[GameState::Lobby])?;

        let mut config = self.store.config(game.config).await?;
        let slot = config
            .slots
            .iter_mut()
            .find(|slot| slot.kind == SlotKind::Invite && slot.user == Some(user))
            .ok_or(GameError::InviteUnavailable)?;
        slot.kind = SlotKind::Open;
        slot.user = None;
        self.store.update_config(&config).await?;
        tracing::info!(game = %game.id, %user, "invite declined");
        Ok(())
    }

    /// Lobby games strangers can still join: an open seat left and a
    /// matching category, oldest first.
    pub async fn find_joinable_games(
        &self,
        type_id: Option<u32>,
        paging: Paging,
    ) -> Result<Vec<Game>, GameError> {
        Ok(self.store.find_lobby_games(type_id, paging).await?)
    }

    async fn invite_for(&self, player: &Player) -> Result<Invite, GameError> {
        if let Some(existing) = self.store.invite_by_inviter(player.id).await? {
            return Ok(existing);
        }
        Ok(self
            .store
            .create_invite(player.id, generate_token())
            .await?)
    }

    fn invite_link(&self, invite: &Invite) -> String {
        format!("{}{}", self.config.invite_url_prefix, invite.token)
    }

    // =====================================================================
    // Shared helpers
    // =====================================================================

    fn require_state(&self, game: &Game, acceptable: &[GameState]) -> Result<(), GameError> {
        if acceptable.contains(&game.state) {
            Ok(())
        } else {
            Err(GameError::invalid_state(acceptable, game.state))
        }
    }

    /// Users of every player seated in the game, any state.
    async fn game_users(&self, game: GameId) -> Result<Vec<UserId>, GameError> {
        Ok(self
            .store
            .players_by_game(game)
            .await?
            .iter()
            .map(|p| p.user)
            .collect())
    }
}

/// Generates a random 32-character hex string (128 bits of entropy) for
/// invite links.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_32_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
