//! Player data structures: waiting participants in the rotation queue.

use crate::models::game::GameType;
use serde::{Deserialize, Serialize};

/// Unique identifier for a player (stable numeric id, allocated by the session).
pub type PlayerId = u32;

/// Player gender, used for game-type validation (mixed/ladies games).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Default skill rating for a new player. Kept for bookkeeping; selection does not read it.
pub const DEFAULT_RATING: u32 = 1000;

/// A participant in the session: waiting in the queue, staged for the next game,
/// or playing on a court.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub gender: Gender,
    /// Guests are full participants; the flag only matters for display and exports.
    pub guest: bool,
    /// Game types this player is willing to play. Empty accepts anything.
    pub preferences: Vec<GameType>,
    /// Resting players stay visible in the queue but are skipped by selection.
    pub resting: bool,
    pub session_wins: u32,
    pub session_losses: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    /// Hidden skill rating (updated by an external rating collaborator).
    pub rating: u32,
}

impl Player {
    /// Create a new player. Counters start at zero, no preferences, not resting.
    pub fn new(id: PlayerId, name: impl Into<String>, gender: Gender, guest: bool) -> Self {
        Self {
            id,
            name: name.into(),
            gender,
            guest,
            preferences: Vec::new(),
            resting: false,
            session_wins: 0,
            session_losses: 0,
            total_wins: 0,
            total_losses: 0,
            rating: DEFAULT_RATING,
        }
    }

    /// True if this player accepts the given game type (empty preferences accept all).
    pub fn accepts(&self, game_type: GameType) -> bool {
        self.preferences.is_empty() || self.preferences.contains(&game_type)
    }

    /// Record a win for this player (session and all-time).
    pub fn record_win(&mut self) {
        self.session_wins += 1;
        self.total_wins += 1;
    }

    /// Record a loss for this player (session and all-time).
    pub fn record_loss(&mut self) {
        self.session_losses += 1;
        self.total_losses += 1;
    }

    /// Reset the per-session counters (new session; all-time counters survive).
    pub fn reset_session_record(&mut self) {
        self.session_wins = 0;
        self.session_losses = 0;
    }
}
