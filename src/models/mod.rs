//! Data structures for the badminton session: players, courts, pairs, history.

mod activity;
mod court;
mod game;
mod piggyback;
mod player;
mod session;

pub use activity::{
    PlayerActivity, SessionActivity, COOLING_RECENT_GAMES, RECENT_GAMES_TRACKED,
};
pub use court::{Court, CourtId, CourtPlayer, CourtStatus, GAME_MINUTES};
pub use game::{GameHistory, GameRecord, GameRecordId, GameType, HISTORY_RETENTION_DAYS};
pub use piggyback::PiggybackPair;
pub use player::{Gender, Player, PlayerId, DEFAULT_RATING};
pub use session::{
    Session, SessionConfig, SessionError, SessionId, StagedGame, StagedOrigin, MAX_COURTS,
    MAX_POOL_SIZE, MIN_COURTS, MIN_POOL_SIZE,
};
