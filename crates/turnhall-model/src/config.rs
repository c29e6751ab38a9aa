//! Seat configuration: the fixed slot layout of a game and its rules.
//!
//! A configuration is immutable after creation except for slot-kind
//! conversions driven by the lifecycle (a leaver's seat re-opens in the
//! lobby or becomes computer-controlled mid-game).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ids::{ConfigId, UserId};

/// Default maximum number of slots per configuration.
pub const MAX_SLOTS: usize = 16;

/// What kind of occupant a slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// Reserved for the game's creator. Exactly one per configuration.
    Creator,
    /// Open to anyone while the game is in the lobby.
    Open,
    /// Reserved for a specific invited user.
    Invite,
    /// Not part of this game. Keeps slot indices stable across layouts.
    Disabled,
    /// Computer-controlled. Either configured up front or produced by a
    /// player leaving a running game.
    Ai,
}

/// Difficulty for a computer-controlled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
}

/// One seat in a game's slot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub kind: SlotKind,
    /// The reserved occupant, required for `Invite` slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    /// Required for `Ai` slots configured up front. Slots converted to
    /// `Ai` by a mid-game departure carry no difficulty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<AiDifficulty>,
}

impl Slot {
    pub fn creator() -> Self {
        Self { kind: SlotKind::Creator, user: None, difficulty: None }
    }

    pub fn open() -> Self {
        Self { kind: SlotKind::Open, user: None, difficulty: None }
    }

    pub fn invite(user: UserId) -> Self {
        Self { kind: SlotKind::Invite, user: Some(user), difficulty: None }
    }

    pub fn disabled() -> Self {
        Self { kind: SlotKind::Disabled, user: None, difficulty: None }
    }

    pub fn ai(difficulty: AiDifficulty) -> Self {
        Self { kind: SlotKind::Ai, user: None, difficulty: Some(difficulty) }
    }
}

/// The validated input for a new configuration, before the store has
/// assigned it an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameConfig {
    /// Ordered slot layout. Slot indices are positions in this list.
    pub slots: Vec<Slot>,
    /// Seconds the current player has to act before their turn times out.
    pub turn_max_secs: u32,
    /// Per-category score modifiers, opaque to the lifecycle.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub score_modifiers: BTreeMap<String, i64>,
    /// Opaque category identifier used to filter joinable-game listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<u32>,
}

impl NewGameConfig {
    /// Checks the slot rules before anything is persisted.
    ///
    /// Rules: exactly one creator slot, at most `max_slots` slots, every
    /// invite slot carries a resolved user, every ai slot carries a
    /// difficulty, and the turn time limit is at least one second.
    pub fn validate(&self, max_slots: usize) -> Result<(), ConfigError> {
        if self.slots.len() > max_slots {
            return Err(ConfigError::TooManySlots {
                count: self.slots.len(),
                max: max_slots,
            });
        }

        let creators = self
            .slots
            .iter()
            .filter(|s| s.kind == SlotKind::Creator)
            .count();
        if creators != 1 {
            return Err(ConfigError::CreatorSlotCount(creators));
        }

        for (index, slot) in self.slots.iter().enumerate() {
            match slot.kind {
                SlotKind::Invite if slot.user.is_none() => {
                    return Err(ConfigError::UnresolvedInvite(index));
                }
                SlotKind::Ai if slot.difficulty.is_none() => {
                    return Err(ConfigError::MissingDifficulty(index));
                }
                _ => {}
            }
        }

        if self.turn_max_secs == 0 {
            return Err(ConfigError::ZeroTurnTimeout);
        }

        Ok(())
    }
}

impl Default for NewGameConfig {
    /// One creator plus three open seats, ten-second turns.
    fn default() -> Self {
        Self {
            slots: vec![Slot::creator(), Slot::open(), Slot::open(), Slot::open()],
            turn_max_secs: 10,
            score_modifiers: BTreeMap::new(),
            type_id: None,
        }
    }
}

/// A stored configuration, owned 1:1 by its game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub id: ConfigId,
    pub slots: Vec<Slot>,
    pub turn_max_secs: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub score_modifiers: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl GameConfig {
    /// The number of seats a full game requires (every non-disabled slot).
    pub fn player_num(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.kind != SlotKind::Disabled)
            .count()
    }

    /// Whether strangers can still be matched into this game.
    pub fn has_open_slot(&self) -> bool {
        self.slots.iter().any(|s| s.kind == SlotKind::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_seater() -> NewGameConfig {
        NewGameConfig {
            slots: vec![Slot::creator(), Slot::open()],
            turn_max_secs: 10,
            score_modifiers: BTreeMap::new(),
            type_id: None,
        }
    }

    #[test]
    fn test_validate_accepts_default_config() {
        assert_eq!(NewGameConfig::default().validate(MAX_SLOTS), Ok(()));
    }

    #[test]
    fn test_validate_rejects_zero_creator_slots() {
        let config = NewGameConfig {
            slots: vec![Slot::open(), Slot::open()],
            ..two_seater()
        };
        assert_eq!(
            config.validate(MAX_SLOTS),
            Err(ConfigError::CreatorSlotCount(0))
        );
    }

    #[test]
    fn test_validate_rejects_two_creator_slots() {
        let config = NewGameConfig {
            slots: vec![Slot::creator(), Slot::creator()],
            ..two_seater()
        };
        assert_eq!(
            config.validate(MAX_SLOTS),
            Err(ConfigError::CreatorSlotCount(2))
        );
    }

    #[test]
    fn test_validate_rejects_too_many_slots() {
        let mut slots = vec![Slot::creator()];
        slots.extend(std::iter::repeat_with(Slot::open).take(MAX_SLOTS));
        let config = NewGameConfig { slots, ..two_seater() };
        assert_eq!(
            config.validate(MAX_SLOTS),
            Err(ConfigError::TooManySlots { count: MAX_SLOTS + 1, max: MAX_SLOTS })
        );
    }

    #[test]
    fn test_validate_rejects_invite_slot_without_user() {
        let config = NewGameConfig {
            slots: vec![
                Slot::creator(),
                Slot { kind: SlotKind::Invite, user: None, difficulty: None },
            ],
            ..two_seater()
        };
        assert_eq!(
            config.validate(MAX_SLOTS),
            Err(ConfigError::UnresolvedInvite(1))
        );
    }

    #[test]
    fn test_validate_rejects_ai_slot_without_difficulty() {
        let config = NewGameConfig {
            slots: vec![
                Slot::creator(),
                Slot { kind: SlotKind::Ai, user: None, difficulty: None },
            ],
            ..two_seater()
        };
        assert_eq!(
            config.validate(MAX_SLOTS),
            Err(ConfigError::MissingDifficulty(1))
        );
    }

    #[test]
    fn test_validate_rejects_zero_turn_timeout() {
        let config = NewGameConfig { turn_max_secs: 0, ..two_seater() };
        assert_eq!(config.validate(MAX_SLOTS), Err(ConfigError::ZeroTurnTimeout));
    }

    #[test]
    fn test_player_num_ignores_disabled_slots() {
        let config = GameConfig {
            id: ConfigId(1),
            slots: vec![
                Slot::creator(),
                Slot::open(),
                Slot::disabled(),
                Slot::ai(AiDifficulty::Easy),
            ],
            turn_max_secs: 10,
            score_modifiers: BTreeMap::new(),
            type_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(config.player_num(), 3);
    }

    #[test]
    fn test_has_open_slot() {
        let mut config = GameConfig {
            id: ConfigId(1),
            slots: vec![Slot::creator(), Slot::open()],
            turn_max_secs: 10,
            score_modifiers: BTreeMap::new(),
            type_id: None,
            created_at: Utc::now(),
        };
        assert!(config.has_open_slot());

        config.slots[1] = Slot::invite(UserId(2));
        assert!(!config.has_open_slot());
    }

    #[test]
    fn test_slot_kind_serializes_lowercase() {
        let json = serde_json::to_string(&SlotKind::Creator).unwrap();
        assert_eq!(json, "\"creator\"");
        let json = serde_json::to_string(&SlotKind::Ai).unwrap();
        assert_eq!(json, "\"ai\"");
    }
}
