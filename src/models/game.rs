//! Game types and the repeat-history log of completed games.

use crate::models::player::PlayerId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a recorded game.
pub type GameRecordId = Uuid;

/// Kind of doubles game. Mixed needs 2 men + 2 women, ladies needs 4 women,
/// open takes any four players.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Open,
    Mixed,
    Ladies,
}

/// Records older than this are dropped when new games are recorded.
pub const HISTORY_RETENTION_DAYS: i64 = 30;

/// One played (or in-flight) game: an unordered set of four participants.
/// Records are append-only; a voided assignment removes its record outright.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameRecordId,
    /// Participant ids, kept sorted so set comparisons are direct.
    pub player_ids: Vec<PlayerId>,
    /// Winning pair, empty while unknown.
    pub winner_ids: Vec<PlayerId>,
    pub played_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn new(player_ids: &[PlayerId], played_at: DateTime<Utc>) -> Self {
        let mut ids = player_ids.to_vec();
        ids.sort_unstable();
        Self {
            id: Uuid::new_v4(),
            player_ids: ids,
            winner_ids: Vec::new(),
            played_at,
        }
    }

    /// True if this record is exactly the given set of players.
    pub fn is_group(&self, sorted_ids: &[PlayerId]) -> bool {
        self.player_ids == sorted_ids
    }

    /// True if both players took part in this game.
    pub fn has_pair(&self, a: PlayerId, b: PlayerId) -> bool {
        // player_ids is sorted, binary_search keeps the hot counting loops cheap
        self.player_ids.binary_search(&a).is_ok() && self.player_ids.binary_search(&b).is_ok()
    }
}

/// Log of games used to penalize repeat groupings. Answers "how many times has
/// this exact group / this pair played together" queries.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameHistory {
    pub records: Vec<GameRecord>,
}

impl GameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for the given four players and prune expired records.
    pub fn record_game(&mut self, player_ids: &[PlayerId], played_at: DateTime<Utc>) -> GameRecordId {
        let record = GameRecord::new(player_ids, played_at);
        let id = record.id;
        self.records.push(record);
        self.prune(played_at);
        id
    }

    /// Fill in the winners on the most recent record for this group (game end).
    pub fn record_winners(&mut self, player_ids: &[PlayerId], winner_ids: &[PlayerId]) {
        let mut ids = player_ids.to_vec();
        ids.sort_unstable();
        if let Some(record) = self.records.iter_mut().rev().find(|r| r.is_group(&ids)) {
            record.winner_ids = winner_ids.to_vec();
        }
    }

    /// Drop the most recent record matching exactly this group (void undo).
    pub fn remove_last_for(&mut self, player_ids: &[PlayerId]) {
        let mut ids = player_ids.to_vec();
        ids.sort_unstable();
        if let Some(pos) = self.records.iter().rposition(|r| r.is_group(&ids)) {
            self.records.remove(pos);
        }
    }

    /// How many times this exact group of players has played together.
    pub fn count_together(&self, player_ids: &[PlayerId]) -> usize {
        let mut ids = player_ids.to_vec();
        ids.sort_unstable();
        self.records.iter().filter(|r| r.is_group(&ids)).count()
    }

    /// How many times these two players have been in the same game.
    pub fn count_pair(&self, a: PlayerId, b: PlayerId) -> usize {
        self.records.iter().filter(|r| r.has_pair(a, b)).count()
    }

    /// Retention: drop records older than [`HISTORY_RETENTION_DAYS`].
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(HISTORY_RETENTION_DAYS);
        self.records.retain(|r| r.played_at >= cutoff);
    }
}
