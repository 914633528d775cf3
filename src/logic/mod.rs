//! Session business logic: game-type validation, selection, piggyback pairs,
//! staging and court play.

mod court_play;
mod game_type;
mod next_game;
mod piggyback;
mod selection;

pub use court_play::{assign_to_court, end_game, void_court_assignment};
pub use game_type::{classify_game, classify_game_with_pair, pair_implied_type};
pub use next_game::{clear_next_game, generate_next_game, select_players_manually};
pub use piggyback::{add_pair, clear_pairs, find_pair_of, remove_pair_by_master};
pub use selection::select_next_game;
