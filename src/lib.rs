//! Badminton session organizer: library with models and business logic.

pub mod logic;
pub mod models;

pub use logic::{
    add_pair, assign_to_court, classify_game, classify_game_with_pair, clear_next_game,
    clear_pairs, end_game, find_pair_of, generate_next_game, pair_implied_type,
    remove_pair_by_master, select_next_game, select_players_manually, void_court_assignment,
};
pub use models::{
    Court, CourtId, CourtPlayer, CourtStatus, GameHistory, GameRecord, GameRecordId, GameType,
    Gender, PiggybackPair, Player, PlayerId, Session, SessionActivity, SessionConfig,
    SessionError, SessionId, StagedGame, StagedOrigin,
};
