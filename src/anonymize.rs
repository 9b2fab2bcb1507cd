//! Per-match anonymization state.
//!
//! Team ids are replaced by 0/1 in order of first appearance. Player ids are
//! never emitted; they are resolved to the position the player currently
//! occupies in their team's lineup. Lineups come from starting XI and
//! tactical shift events and are updated by substitutions, so queries reflect
//! the match as of the event being processed.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::schema::LineupEntry;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnonymizeError {
    #[error("too many teams: {team} seen after {first} and {second}")]
    TooManyTeams { team: u64, first: u64, second: u64 },
}

/// Where a fielded player stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineupSlot {
    pub team: u64,
    /// Index in the team's lineup array.
    pub slot: usize,
    /// StatsBomb position id.
    pub position: u64,
}

/// Mutable state threaded through one match's tokenization.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    teams: [Option<u64>; 2],
    players: HashMap<u64, LineupSlot>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a team id to 0 or 1, assigning the next free code on first sight.
    pub fn resolve_team(&mut self, team_id: u64) -> Result<u8, AnonymizeError> {
        for (code, seen) in self.teams.iter_mut().enumerate() {
            match seen {
                Some(id) if *id == team_id => return Ok(code as u8),
                Some(_) => continue,
                None => {
                    *seen = Some(team_id);
                    debug!(team_id, code, "team mapped");
                    return Ok(code as u8);
                }
            }
        }
        let [first, second] = self.teams;
        Err(AnonymizeError::TooManyTeams {
            team: team_id,
            first: first.unwrap_or_default(),
            second: second.unwrap_or_default(),
        })
    }

    /// Code of an already-seen team.
    pub fn team_code(&self, team_id: u64) -> Option<u8> {
        self.teams
            .iter()
            .position(|t| *t == Some(team_id))
            .map(|i| i as u8)
    }

    /// Replaces the whole lineup of a team.
    pub fn update_lineup(&mut self, team_id: u64, lineup: &[LineupEntry]) {
        self.players.retain(|_, s| s.team != team_id);
        for (slot, entry) in lineup.iter().enumerate() {
            self.players.insert(
                entry.player.id,
                LineupSlot {
                    team: team_id,
                    slot,
                    position: entry.position.id,
                },
            );
        }
    }

    /// Moves `player_on` into `player_off`'s lineup slot.
    ///
    /// The incoming player takes `position` if given, else the outgoing
    /// player's position. An unknown outgoing player puts the incoming one at
    /// the team's next free slot. Returns the outgoing player's slot as it was
    /// before the change.
    pub fn apply_substitution(
        &mut self,
        team_id: u64,
        player_off: u64,
        player_on: u64,
        position: Option<u64>,
    ) -> Option<LineupSlot> {
        let previous = self.players.remove(&player_off);
        if player_on == player_off {
            return previous;
        }
        let (slot, inherited) = match previous {
            Some(p) => (p.slot, Some(p.position)),
            None => {
                warn!(player_off, player_on, "substituted player not in lineup");
                (self.next_slot(team_id), None)
            }
        };
        match position.or(inherited) {
            Some(position) => {
                self.players.insert(
                    player_on,
                    LineupSlot {
                        team: team_id,
                        slot,
                        position,
                    },
                );
            }
            None => warn!(player_on, "incoming player has no position"),
        }
        previous
    }

    /// Current position id of a fielded player.
    pub fn resolve_position(&self, player_id: u64) -> Option<u64> {
        self.players.get(&player_id).map(|s| s.position)
    }

    pub fn lineup_slot(&self, player_id: u64) -> Option<LineupSlot> {
        self.players.get(&player_id).copied()
    }

    /// Number of fielded players known for a team.
    pub fn fielded(&self, team_id: u64) -> usize {
        self.players.values().filter(|s| s.team == team_id).count()
    }

    fn next_slot(&self, team_id: u64) -> usize {
        self.players
            .values()
            .filter(|s| s.team == team_id)
            .map(|s| s.slot + 1)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IdName;

    fn lineup(entries: &[(u64, u64)]) -> Vec<LineupEntry> {
        entries
            .iter()
            .map(|&(player, position)| LineupEntry {
                player: IdName::new(player),
                position: IdName::new(position),
                jersey_number: None,
            })
            .collect()
    }

    #[test]
    fn teams_map_in_first_seen_order() {
        let mut s = MatchState::new();
        assert_eq!(s.resolve_team(217), Ok(0));
        assert_eq!(s.resolve_team(206), Ok(1));
        assert_eq!(s.resolve_team(217), Ok(0));
        assert_eq!(s.resolve_team(206), Ok(1));
        assert_eq!(s.team_code(206), Some(1));
        assert_eq!(s.team_code(1), None);
    }

    #[test]
    fn third_team_is_an_error() {
        let mut s = MatchState::new();
        s.resolve_team(1).unwrap();
        s.resolve_team(2).unwrap();
        assert_eq!(
            s.resolve_team(3),
            Err(AnonymizeError::TooManyTeams {
                team: 3,
                first: 1,
                second: 2
            })
        );
    }

    #[test]
    fn lineup_resolves_positions() {
        let mut s = MatchState::new();
        s.update_lineup(1, &lineup(&[(10, 1), (7, 6), (11, 2)]));
        assert_eq!(s.resolve_position(7), Some(6));
        assert_eq!(s.lineup_slot(7).map(|l| l.slot), Some(1));
        assert_eq!(s.resolve_position(99), None);
    }

    #[test]
    fn lineup_update_replaces_team() {
        let mut s = MatchState::new();
        s.update_lineup(1, &lineup(&[(10, 1), (7, 6)]));
        s.update_lineup(2, &lineup(&[(20, 1)]));
        s.update_lineup(1, &lineup(&[(7, 2)]));
        assert_eq!(s.resolve_position(10), None, "stale player dropped");
        assert_eq!(s.resolve_position(7), Some(2));
        assert_eq!(s.resolve_position(20), Some(1), "other team untouched");
        assert_eq!(s.fielded(1), 1);
    }

    #[test]
    fn substitution_inherits_slot() {
        let mut s = MatchState::new();
        s.update_lineup(1, &lineup(&[(10, 1), (7, 6)]));
        let prev = s.apply_substitution(1, 7, 70, None);
        assert_eq!(prev.map(|p| p.position), Some(6));
        assert_eq!(s.resolve_position(7), None);
        assert_eq!(s.lineup_slot(70).map(|l| (l.slot, l.position)), Some((1, 6)));
    }

    #[test]
    fn substitution_takes_given_position() {
        let mut s = MatchState::new();
        s.update_lineup(1, &lineup(&[(10, 1), (7, 6)]));
        s.apply_substitution(1, 7, 70, Some(23));
        assert_eq!(s.resolve_position(70), Some(23));
    }

    #[test]
    fn substitution_of_unknown_player_appends() {
        let mut s = MatchState::new();
        s.update_lineup(1, &lineup(&[(10, 1), (7, 6)]));
        assert_eq!(s.apply_substitution(1, 99, 70, Some(17)), None);
        assert_eq!(s.lineup_slot(70).map(|l| l.slot), Some(2));
    }

    #[test]
    fn self_substitution_removes_player() {
        let mut s = MatchState::new();
        s.update_lineup(1, &lineup(&[(10, 1), (7, 6)]));
        s.apply_substitution(1, 7, 7, None);
        assert_eq!(s.resolve_position(7), None);
        assert_eq!(s.fielded(1), 1);
    }
}
