//! Turn rotation: a pure, deterministic seat-order scan.

use turnhall_model::{Player, PlayerId};

/// Picks the next occupant from the active players of a game.
///
/// Scans slots in ascending order starting strictly after the current
/// occupant's slot, wrapping to the lowest slot when the end is reached.
/// A sole remaining active player — even the occupant itself — is
/// returned again so a solo game keeps taking turns; `None` means no
/// active player is left at all.
///
/// `current` may or may not appear in `active`: a departed occupant is
/// already marked inactive when its replacement is computed.
pub fn next_occupant<'a>(
    current: PlayerId,
    current_slot: usize,
    active: &'a [Player],
) -> Option<&'a Player> {
    let mut by_slot: Vec<&Player> = active.iter().collect();
    by_slot.sort_by_key(|p| p.slot);

    by_slot
        .iter()
        .find(|p| p.slot > current_slot && p.id != current)
        .or_else(|| by_slot.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use turnhall_model::{GameId, PlayerState, UserId};

    use super::*;

    fn player(id: u64, slot: usize) -> Player {
        Player {
            id: PlayerId(id),
            game: GameId(1),
            user: UserId(id),
            slot,
            state: PlayerState::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_next_occupant_picks_following_slot() {
        let active = vec![player(1, 0), player(2, 1), player(3, 2)];
        let next = next_occupant(PlayerId(1), 0, &active).unwrap();
        assert_eq!(next.id, PlayerId(2));
    }

    #[test]
    fn test_next_occupant_skips_missing_slots() {
        // Slot 1 has no active player (left mid-game).
        let active = vec![player(1, 0), player(3, 2)];
        let next = next_occupant(PlayerId(1), 0, &active).unwrap();
        assert_eq!(next.id, PlayerId(3));
    }

    #[test]
    fn test_next_occupant_wraps_to_lowest_slot() {
        let active = vec![player(1, 0), player(2, 1), player(3, 2)];
        let next = next_occupant(PlayerId(3), 2, &active).unwrap();
        assert_eq!(next.id, PlayerId(1));
    }

    #[test]
    fn test_sole_active_player_keeps_playing() {
        // One player left in the game: they stay the occupant, the
        // rotation never reports "no next occupant" here.
        let active = vec![player(1, 0)];
        let next = next_occupant(PlayerId(1), 0, &active).unwrap();
        assert_eq!(next.id, PlayerId(1));
    }

    #[test]
    fn test_no_active_players_yields_none() {
        assert!(next_occupant(PlayerId(1), 0, &[]).is_none());
    }

    #[test]
    fn test_departed_occupant_is_not_revisited() {
        // The occupant left (not in the active set); rotation moves on.
        let active = vec![player(2, 1), player(3, 2)];
        let next = next_occupant(PlayerId(1), 0, &active).unwrap();
        assert_eq!(next.id, PlayerId(2));

        // Departed occupant held the highest slot: wrap to the lowest.
        let next = next_occupant(PlayerId(4), 3, &active).unwrap();
        assert_eq!(next.id, PlayerId(2));
    }

    #[test]
    fn test_rotation_is_deterministic() {
        let active = vec![player(1, 0), player(2, 1), player(3, 2)];
        let first = next_occupant(PlayerId(2), 1, &active).unwrap().id;
        for _ in 0..10 {
            assert_eq!(next_occupant(PlayerId(2), 1, &active).unwrap().id, first);
        }
    }

    #[test]
    fn test_full_cycle_visits_every_slot_in_order() {
        let active = vec![player(1, 0), player(2, 1), player(3, 2)];
        let mut occupant = &active[0];
        let mut visited = Vec::new();
        for _ in 0..6 {
            occupant = next_occupant(occupant.id, occupant.slot, &active).unwrap();
            visited.push(occupant.id.0);
        }
        assert_eq!(visited, vec![2, 3, 1, 2, 3, 1]);
    }
}
