//! Tunables the session layer consumes.

use std::time::Duration;

use turnhall_model::MAX_SLOTS;

/// Configuration surface of the game service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Hard cap on outstanding games per creator.
    pub game_limit_total: usize,
    /// Cap on games created within the trailing window.
    pub game_limit_recent: usize,
    /// Length of the trailing creation window.
    pub recent_window: Duration,
    /// How long after creation the creator must wait before a manual start.
    pub manual_start_grace: Duration,
    /// Maximum seats per configuration.
    pub max_slots: usize,
    /// Rounds of unanimous timeouts before a game is considered abandoned.
    /// The effective limit is this multiplied by the seat count.
    pub inactive_rounds_limit: u32,
    /// How long a lobby waits before the expiry job forces a decision.
    pub lobby_expiry: Duration,
    /// Prefix the invite token is appended to when building join links.
    pub invite_url_prefix: String,
    /// Turn time limit applied when a configuration omits one.
    pub default_turn_max_secs: u32,
}

impl ServiceConfig {
    /// Consecutive timeouts that mark a game as fully inactive.
    pub fn inactivity_limit(&self, player_num: usize) -> u32 {
        self.inactive_rounds_limit * player_num as u32
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            game_limit_total: 20,
            game_limit_recent: 10,
            recent_window: Duration::from_secs(60 * 60),
            manual_start_grace: Duration::from_secs(10),
            max_slots: MAX_SLOTS,
            inactive_rounds_limit: 2,
            lobby_expiry: Duration::from_secs(2 * 24 * 60 * 60),
            invite_url_prefix: "/join/".to_string(),
            default_turn_max_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = ServiceConfig::default();
        assert_eq!(config.game_limit_total, 20);
        assert_eq!(config.game_limit_recent, 10);
        assert_eq!(config.max_slots, 16);
        assert_eq!(config.lobby_expiry, Duration::from_secs(172_800));
    }

    #[test]
    fn test_inactivity_limit_scales_with_seats() {
        let config = ServiceConfig::default();
        assert_eq!(config.inactivity_limit(2), 4);
        assert_eq!(config.inactivity_limit(4), 8);
    }
}
