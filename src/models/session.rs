//! Session state: the rotation queue, the staged next game, the courts and
//! everything that keeps them consistent. All mutation goes through the
//! session (or the free functions in `logic/` that take `&mut Session`); no
//! other component writes queue, staging or courts directly.

use crate::models::activity::SessionActivity;
use crate::models::court::{Court, CourtId};
use crate::models::game::{GameHistory, GameType};
use crate::models::piggyback::PiggybackPair;
use crate::models::player::{Gender, Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Errors that can occur during session operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionError {
    /// Session is not in a state that allows this action.
    InvalidState,
    /// Fewer than four selectable players are waiting.
    NotEnoughPlayers,
    /// The selection engine found no four players that form a valid game.
    NoValidCombination,
    /// Player not found where the action expected them.
    PlayerNotFound(PlayerId),
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// Wrong number of active players selected (a game needs exactly 4).
    WrongNumberOfPlayers { needed: usize, selected: usize },
    /// Court not found.
    CourtNotFound(CourtId),
    /// Court already hosts a game.
    CourtOccupied(CourtId),
    /// Court has no game to end or void.
    CourtNotOccupied(CourtId),
    /// No staged next game to act on.
    NoNextGame,
    /// No active pair with this player as master.
    PairNotFound(PlayerId),
    /// Piggyback pairing is disabled in the session settings.
    PiggybackDisabled,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidState => write!(f, "Invalid state for this action"),
            SessionError::NotEnoughPlayers => {
                write!(f, "Need at least 4 selectable players in the queue")
            }
            SessionError::NoValidCombination => {
                write!(f, "No valid combination of 4 players was found")
            }
            SessionError::PlayerNotFound(_) => write!(f, "Player not found"),
            SessionError::DuplicatePlayerName => {
                write!(f, "A player with this name already exists")
            }
            SessionError::WrongNumberOfPlayers { needed, selected } => {
                write!(f, "Must select exactly {} active players (selected {})", needed, selected)
            }
            SessionError::CourtNotFound(_) => write!(f, "Court not found"),
            SessionError::CourtOccupied(_) => write!(f, "Court already has a game in progress"),
            SessionError::CourtNotOccupied(_) => write!(f, "Court has no game in progress"),
            SessionError::NoNextGame => write!(f, "No next game has been staged"),
            SessionError::PairNotFound(_) => write!(f, "No pair with this player as master"),
            SessionError::PiggybackDisabled => write!(f, "Piggyback pairing is disabled"),
        }
    }
}

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// Session settings, passed explicitly to the selection engine and validated
/// into range on the way in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Only the first `pool_size` waiting players are eligible for auto-selection.
    pub pool_size: usize,
    /// Honor per-player game-type preferences. When off, any four players match.
    pub preferences_enabled: bool,
    /// Track win/loss records when games end.
    pub score_keeping_enabled: bool,
    /// Allow piggyback pairs.
    pub piggyback_enabled: bool,
    pub court_count: u32,
    /// Wall-clock budget for one auto-selection run.
    pub selection_budget_ms: u64,
}

pub const MIN_POOL_SIZE: usize = 6;
pub const MAX_POOL_SIZE: usize = 12;
pub const MIN_COURTS: u32 = 1;
pub const MAX_COURTS: u32 = 8;

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            preferences_enabled: false,
            score_keeping_enabled: true,
            piggyback_enabled: true,
            court_count: 2,
            selection_budget_ms: 2000,
        }
    }
}

impl SessionConfig {
    /// Clamp every setting into its legal range.
    pub fn clamped(mut self) -> Self {
        self.pool_size = self.pool_size.clamp(MIN_POOL_SIZE, MAX_POOL_SIZE);
        self.court_count = self.court_count.clamp(MIN_COURTS, MAX_COURTS);
        self
    }
}

/// Where the staged players came from. Decides where they go back on clear:
/// a manually cleared selection must not cost anyone their queue position,
/// while players whose game was voided jump to the front of the queue.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagedOrigin {
    Queue,
    Void,
}

/// The "next game" holding area: four players pulled out of the queue (or off
/// a voided court), pending assignment to a court.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StagedGame {
    pub players: Vec<Player>,
    pub origin: StagedOrigin,
    /// Queue index each player held when removed (Queue origin only).
    pub original_positions: Vec<(PlayerId, usize)>,
}

/// Full session state: queue, staged next game, courts, pairs and trackers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Waiting players in rotation order.
    pub queue: Vec<Player>,
    pub next_game: Option<StagedGame>,
    pub courts: Vec<Court>,
    /// Full records of players currently on court, keyed by court. The court
    /// itself only carries the reduced display view.
    pub court_rosters: HashMap<CourtId, Vec<Player>>,
    pub pairs: Vec<PiggybackPair>,
    pub history: GameHistory,
    pub activity: SessionActivity,
    pub config: SessionConfig,
    /// One-shot messages for the UI (drained on read).
    pub advisories: Vec<String>,
    pub next_player_id: PlayerId,
}

impl Session {
    /// Create a new session with available courts per the (clamped) config.
    pub fn new(config: SessionConfig) -> Self {
        let config = config.clamped();
        let courts = (1..=config.court_count).map(Court::new).collect();
        Self {
            id: Uuid::new_v4(),
            queue: Vec::new(),
            next_game: None,
            courts,
            court_rosters: HashMap::new(),
            pairs: Vec::new(),
            history: GameHistory::new(),
            activity: SessionActivity::new(),
            config,
            advisories: Vec::new(),
            next_player_id: 1,
        }
    }

    /// Add a player to the back of the queue. Names must be unique across the
    /// whole session (case-insensitive).
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        gender: Gender,
        guest: bool,
    ) -> Result<PlayerId, SessionError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(SessionError::InvalidState);
        }
        let is_duplicate = self
            .all_players()
            .any(|p| p.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(SessionError::DuplicatePlayerName);
        }
        let id = self.next_player_id;
        self.next_player_id += 1;
        self.queue.push(Player::new(id, name_trimmed, gender, guest));
        Ok(id)
    }

    /// Remove a player from the session. Only legal while the player is
    /// waiting in the queue; staged and on-court players must finish first.
    /// Any pair the player belongs to dissolves (restoring the master's
    /// position if the leaver was the partner).
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), SessionError> {
        if !self.queue.iter().any(|p| p.id == id) {
            if self.all_players().any(|p| p.id == id) {
                return Err(SessionError::InvalidState);
            }
            return Err(SessionError::PlayerNotFound(id));
        }
        self.dissolve_pairs_of(id);
        self.queue.retain(|p| p.id != id);
        Ok(())
    }

    /// Move a waiting player to a new queue index (clamped to the queue end).
    pub fn move_player(&mut self, id: PlayerId, new_index: usize) -> Result<(), SessionError> {
        let idx = self
            .queue
            .iter()
            .position(|p| p.id == id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        let player = self.queue.remove(idx);
        let new_index = new_index.min(self.queue.len());
        self.queue.insert(new_index, player);
        Ok(())
    }

    /// Toggle a waiting player's resting flag.
    pub fn set_resting(&mut self, id: PlayerId, resting: bool) -> Result<(), SessionError> {
        let player = self
            .queue
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        player.resting = resting;
        Ok(())
    }

    /// Replace a waiting player's game-type preferences.
    pub fn set_preferences(
        &mut self,
        id: PlayerId,
        preferences: Vec<GameType>,
    ) -> Result<(), SessionError> {
        let player = self
            .queue
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        player.preferences = preferences;
        Ok(())
    }

    /// Apply new settings. Growing the court count appends available courts;
    /// shrinking drops trailing courts and refuses if one of them is occupied,
    /// leaving everything untouched.
    pub fn apply_config(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        let config = config.clamped();
        let target = config.court_count as usize;
        if let Some(c) = self.courts.iter().skip(target).find(|c| !c.is_available()) {
            return Err(SessionError::CourtOccupied(c.id));
        }
        self.courts.truncate(target);
        while self.courts.len() < target {
            let next_id = self.courts.iter().map(|c| c.id).max().unwrap_or(0) + 1;
            self.courts.push(Court::new(next_id));
        }
        self.config = config;
        Ok(())
    }

    /// Start a fresh session with the same people: staged and on-court players
    /// rejoin the queue, per-session counters and trackers reset, pairs clear.
    /// All-time win/loss records and the (retention-pruned) game history survive.
    pub fn start_new_session(&mut self) {
        if let Some(staged) = self.next_game.take() {
            self.queue.extend(staged.players);
        }
        let court_ids: Vec<CourtId> = self.courts.iter().map(|c| c.id).collect();
        for court_id in court_ids {
            if let Some(roster) = self.court_rosters.remove(&court_id) {
                self.queue.extend(roster);
            }
        }
        for court in &mut self.courts {
            court.release();
        }
        for player in &mut self.queue {
            player.reset_session_record();
            player.resting = false;
        }
        self.pairs.clear();
        self.activity.reset();
        self.advisories.clear();
    }

    /// Drain the one-shot advisory messages.
    pub fn take_advisories(&mut self) -> Vec<String> {
        std::mem::take(&mut self.advisories)
    }

    /// All players known to the session, wherever they currently live.
    pub fn all_players(&self) -> impl Iterator<Item = &Player> {
        self.queue
            .iter()
            .chain(self.next_game.iter().flat_map(|g| g.players.iter()))
            .chain(self.court_rosters.values().flatten())
    }

    pub fn find_waiting(&self, id: PlayerId) -> Option<&Player> {
        self.queue.iter().find(|p| p.id == id)
    }

    pub fn queue_position(&self, id: PlayerId) -> Option<usize> {
        self.queue.iter().position(|p| p.id == id)
    }

    pub fn court(&self, id: CourtId) -> Option<&Court> {
        self.courts.iter().find(|c| c.id == id)
    }

    pub fn court_mut(&mut self, id: CourtId) -> Option<&mut Court> {
        self.courts.iter_mut().find(|c| c.id == id)
    }

    /// Active pair containing this player, if any.
    pub fn pair_of(&self, id: PlayerId) -> Option<&PiggybackPair> {
        self.pairs.iter().find(|pair| pair.contains(id))
    }

    /// Put a player back at a previously recorded queue index (clamped).
    pub(crate) fn restore_to_index(&mut self, player: Player, index: usize) {
        let index = index.min(self.queue.len());
        self.queue.insert(index, player);
    }

    /// Drop every pair containing this player. If the player was the partner,
    /// the master is first moved back to its recorded origin index.
    pub(crate) fn dissolve_pairs_of(&mut self, id: PlayerId) {
        let affected: Vec<PiggybackPair> = self
            .pairs
            .iter()
            .copied()
            .filter(|pair| pair.contains(id))
            .collect();
        self.pairs.retain(|pair| !pair.contains(id));
        for pair in affected {
            if pair.partner == id {
                if let Some(origin) = pair.master_origin_index {
                    if let Some(idx) = self.queue_position(pair.master) {
                        let master = self.queue.remove(idx);
                        self.restore_to_index(master, origin);
                    }
                }
            }
        }
    }
}
