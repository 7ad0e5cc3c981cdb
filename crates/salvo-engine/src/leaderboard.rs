//! Win counts across all sessions.

use std::collections::HashMap;

use salvo_protocol::{LeaderboardEntry, PlayerId};

/// Wins per player for the life of the process.
///
/// Enrolled players are listed with zero wins until they win.
#[derive(Debug, Default)]
pub struct Leaderboard {
    wins: HashMap<PlayerId, u32>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists `player_id` with zero wins. Returns `false` if already listed.
    pub fn enroll(&mut self, player_id: PlayerId) -> bool {
        if self.wins.contains_key(&player_id) {
            return false;
        }
        self.wins.insert(player_id, 0);
        true
    }

    /// Adds one win and returns the new total.
    pub fn record_win(&mut self, player_id: PlayerId) -> u32 {
        let wins = self.wins.entry(player_id).or_insert(0);
        *wins += 1;
        *wins
    }

    pub fn wins_of(&self, player_id: PlayerId) -> u32 {
        self.wins.get(&player_id).copied().unwrap_or(0)
    }

    /// Most wins first; ties broken by player id.
    pub fn snapshot(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<_> = self
            .wins
            .iter()
            .map(|(&player_id, &wins)| LeaderboardEntry { player_id, wins })
            .collect();
        entries.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.player_id.cmp(&b.player_id)));
        entries
    }
}
