//! Court data structures: playing surfaces that hold exactly four players or none.

use crate::models::player::{Gender, Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Unique identifier for a court.
pub type CourtId = u32;

/// Minutes shown on a freshly assigned court. Display only, nothing ticks it down here.
pub const GAME_MINUTES: u32 = 15;

/// Whether a court currently hosts a game.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourtStatus {
    #[default]
    Available,
    Occupied,
}

/// Reduced view of a player for court display (the full record stays with the session).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtPlayer {
    pub id: PlayerId,
    pub name: String,
    pub gender: Gender,
    pub guest: bool,
}

impl CourtPlayer {
    pub fn from_player(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            gender: p.gender,
            guest: p.guest,
        }
    }
}

/// A court: available (no players) or occupied (exactly four players).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    pub status: CourtStatus,
    /// Empty when available, exactly four entries when occupied.
    pub players: Vec<CourtPlayer>,
    /// Cosmetic countdown, set on assignment and zeroed on release.
    pub remaining_minutes: u32,
}

impl Court {
    pub fn new(id: CourtId) -> Self {
        Self {
            id,
            name: format!("Court {}", id),
            status: CourtStatus::Available,
            players: Vec::new(),
            remaining_minutes: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == CourtStatus::Available
    }

    /// Put four players on the court.
    pub fn occupy(&mut self, players: Vec<CourtPlayer>) {
        self.status = CourtStatus::Occupied;
        self.players = players;
        self.remaining_minutes = GAME_MINUTES;
    }

    /// Clear the court back to available.
    pub fn release(&mut self) {
        self.status = CourtStatus::Available;
        self.players.clear();
        self.remaining_minutes = 0;
    }
}
