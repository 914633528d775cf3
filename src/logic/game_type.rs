//! Game-type validation: which kind of game four players can and will play.

use crate::models::{GameType, Gender, Player};

/// Fixed fallback priority when neither a pair nor the top player decides.
const FALLBACK_PRIORITY: [GameType; 3] = [GameType::Mixed, GameType::Ladies, GameType::Open];

fn physically_possible(game_type: GameType, players: &[&Player]) -> bool {
    let females = players.iter().filter(|p| p.gender == Gender::Female).count();
    let males = players.len() - females;
    match game_type {
        GameType::Open => true,
        GameType::Mixed => males == 2 && females == 2,
        GameType::Ladies => females == players.len(),
    }
}

fn viable(game_type: GameType, players: &[&Player]) -> bool {
    physically_possible(game_type, players) && players.iter().all(|p| p.accepts(game_type))
}

/// Decide which game type four players will play, or `None` when no type is
/// both physically possible and accepted by all four.
///
/// 1. With preferences disabled any four players play an open game.
/// 2. Otherwise the queue-topmost player's preference list is consulted in order.
/// 3. Failing that, the fixed priority Mixed -> Ladies -> Open applies.
///
/// Players must be passed in queue order: the first entry is the topmost player.
pub fn classify_game(players: &[&Player], preferences_enabled: bool) -> Option<GameType> {
    classify_game_with_pair(players, None, preferences_enabled)
}

/// Like [`classify_game`], but tries a piggyback pair's implied game type
/// before consulting the top player's preferences.
pub fn classify_game_with_pair(
    players: &[&Player],
    implied: Option<GameType>,
    preferences_enabled: bool,
) -> Option<GameType> {
    if players.len() != 4 {
        return None;
    }
    if !preferences_enabled {
        return Some(GameType::Open);
    }
    if let Some(t) = implied {
        if viable(t, players) {
            return Some(t);
        }
    }
    for &t in &players[0].preferences {
        if viable(t, players) {
            return Some(t);
        }
    }
    FALLBACK_PRIORITY.iter().copied().find(|&t| viable(t, players))
}

/// Game type a pair's genders imply: two women play ladies, two men open,
/// a mixed-gender pair mixed.
pub fn pair_implied_type(a: Gender, b: Gender) -> GameType {
    match (a, b) {
        (Gender::Female, Gender::Female) => GameType::Ladies,
        (Gender::Male, Gender::Male) => GameType::Open,
        _ => GameType::Mixed,
    }
}
