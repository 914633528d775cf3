//! Integration tests for the automatic selection engine.

use badminton_session_web::{
    add_pair, assign_to_court, classify_game, end_game, select_next_game,
    select_players_manually, GameType, Gender, Player, Session, SessionConfig,
};

fn config(preferences_enabled: bool) -> SessionConfig {
    SessionConfig {
        preferences_enabled,
        ..SessionConfig::default()
    }
}

fn session_with(players: &[(&str, Gender)], preferences_enabled: bool) -> Session {
    let mut s = Session::new(config(preferences_enabled));
    for &(name, gender) in players {
        s.add_player(name, gender, false).unwrap();
    }
    s
}

fn run(s: &Session) -> Vec<Player> {
    select_next_game(&s.queue, &s.pairs, &s.history, &s.activity, &s.config)
}

#[test]
fn fewer_than_four_selectable_players_yields_nothing() {
    let s = session_with(
        &[
            ("Anna", Gender::Female),
            ("Ben", Gender::Male),
            ("Cleo", Gender::Female),
        ],
        false,
    );
    assert!(run(&s).is_empty());
}

#[test]
fn four_player_pool_returns_the_only_combination() {
    let s = session_with(
        &[
            ("Ben", Gender::Male),
            ("Anna", Gender::Female),
            ("Dan", Gender::Male),
            ("Cleo", Gender::Female),
        ],
        false,
    );
    let picked = run(&s);
    let ids: Vec<_> = picked.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn resting_players_are_never_selected() {
    let mut s = session_with(
        &[
            ("Anna", Gender::Female),
            ("Ben", Gender::Male),
            ("Cleo", Gender::Female),
            ("Dan", Gender::Male),
            ("Eva", Gender::Female),
        ],
        false,
    );
    s.set_resting(3, true).unwrap();
    let picked = run(&s);
    assert_eq!(picked.len(), 4);
    assert!(picked.iter().all(|p| p.id != 3));
}

#[test]
fn selection_stays_within_the_pool_window() {
    let mut s = Session::new(SessionConfig {
        pool_size: 6,
        ..SessionConfig::default()
    });
    for i in 0..9 {
        s.add_player(format!("P{i}"), Gender::Male, false).unwrap();
    }
    let picked = run(&s);
    assert_eq!(picked.len(), 4);
    // Ids are handed out in queue order, so the window is the first six ids.
    assert!(picked.iter().all(|p| p.id <= 6));
}

#[test]
fn returned_game_type_is_accepted_by_all_four() {
    let mut s = session_with(
        &[
            ("Anna", Gender::Female),
            ("Ben", Gender::Male),
            ("Cleo", Gender::Female),
            ("Dan", Gender::Male),
            ("Eva", Gender::Female),
            ("Finn", Gender::Male),
        ],
        true,
    );
    s.set_preferences(2, vec![GameType::Mixed]).unwrap();
    s.set_preferences(3, vec![GameType::Mixed, GameType::Ladies]).unwrap();
    s.set_preferences(6, vec![GameType::Open, GameType::Mixed]).unwrap();

    let picked = run(&s);
    assert_eq!(picked.len(), 4);
    let refs: Vec<&Player> = picked.iter().collect();
    let game_type = classify_game(&refs, true).expect("selected combination must classify");
    assert!(picked
        .iter()
        .all(|p| p.preferences.is_empty() || p.preferences.contains(&game_type)));
}

#[test]
fn a_full_pair_is_kept_together() {
    // The four unpaired players only accept mixed games but are three men and
    // one woman, so every valid foursome must include both paired women.
    let mut s = session_with(
        &[
            ("Anna", Gender::Female),
            ("Bea", Gender::Female),
            ("Carl", Gender::Male),
            ("Dave", Gender::Male),
            ("Ed", Gender::Male),
            ("Faye", Gender::Female),
        ],
        true,
    );
    for id in 3..=6 {
        s.set_preferences(id, vec![GameType::Mixed]).unwrap();
    }
    add_pair(&mut s, 1, 2).unwrap();

    let picked = run(&s);
    assert_eq!(picked.len(), 4);
    let ids: Vec<_> = picked.iter().map(|p| p.id).collect();
    assert!(ids.contains(&1) && ids.contains(&2));
}

#[test]
fn no_result_rather_than_a_split_pair() {
    // Every foursome either splits the pair or fails preference checks: the
    // paired women only play ladies games, the three men only mixed.
    let mut s = session_with(
        &[
            ("Anna", Gender::Female),
            ("Bea", Gender::Female),
            ("Carl", Gender::Male),
            ("Dave", Gender::Male),
            ("Ed", Gender::Male),
        ],
        true,
    );
    s.set_preferences(1, vec![GameType::Ladies]).unwrap();
    s.set_preferences(2, vec![GameType::Ladies]).unwrap();
    for id in 3..=5 {
        s.set_preferences(id, vec![GameType::Mixed]).unwrap();
    }
    add_pair(&mut s, 1, 2).unwrap();

    assert!(run(&s).is_empty());
}

#[test]
fn recently_played_foursome_is_not_repeated_wholesale() {
    let mut s = session_with(
        &[
            ("Anna", Gender::Female),
            ("Ben", Gender::Male),
            ("Cleo", Gender::Female),
            ("Dan", Gender::Male),
            ("Eva", Gender::Female),
        ],
        false,
    );
    // Players 1-4 just played together; player 5 has not played at all.
    select_players_manually(&mut s, &[1, 2, 3, 4]).unwrap();
    assign_to_court(&mut s, 1).unwrap();
    end_game(&mut s, 1, &[]).unwrap();

    let picked = run(&s);
    assert_eq!(picked.len(), 4);
    assert!(
        picked.iter().any(|p| p.id == 5),
        "the fresh player should displace one of the repeat group"
    );
}
