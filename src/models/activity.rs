//! Per-session play activity: games played, last-game times and recent co-players.
//! Feeds the fairness (balance) and cooling-period signals of selection.

use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// How many recent co-player sets are kept per player for the variety signal.
pub const RECENT_GAMES_TRACKED: usize = 5;

/// A player whose last game falls within this many most-recent distinct
/// game times across the pool is considered to be in their cooling period.
pub const COOLING_RECENT_GAMES: usize = 2;

/// Transient per-player counters for the current session.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerActivity {
    pub games_played: u32,
    pub last_played_at: Option<DateTime<Utc>>,
    /// Newest first, capped at [`RECENT_GAMES_TRACKED`].
    pub recent_coplayers: VecDeque<Vec<PlayerId>>,
}

/// Session balance tracker. Reset when a new session begins; never persisted
/// across sessions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionActivity {
    players: HashMap<PlayerId, PlayerActivity>,
}

impl SessionActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerActivity> {
        self.players.get(&id)
    }

    fn games_played(&self, id: PlayerId) -> u32 {
        self.players.get(&id).map_or(0, |a| a.games_played)
    }

    /// Record that these players just started a game together.
    pub fn record_game(&mut self, player_ids: &[PlayerId], played_at: DateTime<Utc>) {
        for &id in player_ids {
            let coplayers: Vec<PlayerId> =
                player_ids.iter().copied().filter(|&other| other != id).collect();
            let entry = self.players.entry(id).or_default();
            entry.games_played += 1;
            entry.last_played_at = Some(played_at);
            entry.recent_coplayers.push_front(coplayers);
            entry.recent_coplayers.truncate(RECENT_GAMES_TRACKED);
        }
    }

    /// Undo the most recent [`record_game`](Self::record_game) for these players
    /// (court assignment was voided). `last_played_at` is left alone: the players
    /// sit in the staging slot afterwards, so cooling cannot misfire against them.
    pub fn revert_game(&mut self, player_ids: &[PlayerId]) {
        for &id in player_ids {
            if let Some(entry) = self.players.get_mut(&id) {
                entry.games_played = entry.games_played.saturating_sub(1);
                entry.recent_coplayers.pop_front();
            }
        }
    }

    /// Fairness score: how far below the pool average this player's game count
    /// sits, floored at zero. Higher means more overdue for a game.
    pub fn balance_score(&self, id: PlayerId, pool_ids: &[PlayerId]) -> f64 {
        if pool_ids.is_empty() {
            return 0.0;
        }
        let total: u32 = pool_ids.iter().map(|&p| self.games_played(p)).sum();
        let average = f64::from(total) / pool_ids.len() as f64;
        (average - f64::from(self.games_played(id))).max(0.0)
    }

    /// Players in their cooling period: those whose last game ranks within the
    /// [`COOLING_RECENT_GAMES`] most recent distinct game times across the pool.
    pub fn cooling_ids(&self, pool_ids: &[PlayerId]) -> HashSet<PlayerId> {
        let mut times: Vec<DateTime<Utc>> = pool_ids
            .iter()
            .filter_map(|&id| self.players.get(&id).and_then(|a| a.last_played_at))
            .collect();
        times.sort_unstable_by(|a, b| b.cmp(a));
        times.dedup();
        times.truncate(COOLING_RECENT_GAMES);

        pool_ids
            .iter()
            .copied()
            .filter(|&id| {
                self.players
                    .get(&id)
                    .and_then(|a| a.last_played_at)
                    .is_some_and(|t| times.contains(&t))
            })
            .collect()
    }

    pub fn is_cooling(&self, id: PlayerId, pool_ids: &[PlayerId]) -> bool {
        self.cooling_ids(pool_ids).contains(&id)
    }

    /// Recent co-player sets of one player, newest first (empty if never played).
    pub fn recent_coplayer_sets(&self, id: PlayerId) -> impl Iterator<Item = &Vec<PlayerId>> {
        self.players
            .get(&id)
            .into_iter()
            .flat_map(|a| a.recent_coplayers.iter())
    }

    /// Wipe everything (new session).
    pub fn reset(&mut self) {
        self.players.clear();
    }
}
