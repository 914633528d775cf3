//! Integration tests for staging, court play and the queue state machine.

use badminton_session_web::{
    add_pair, assign_to_court, clear_next_game, end_game, generate_next_game,
    select_players_manually, void_court_assignment, Gender, PlayerId, Session, SessionConfig,
    SessionError, StagedOrigin,
};
use std::collections::HashSet;

fn session_with_players(n: u32) -> Session {
    let mut s = Session::new(SessionConfig::default());
    for i in 1..=n {
        let gender = if i % 2 == 0 { Gender::Female } else { Gender::Male };
        s.add_player(format!("P{i}"), gender, false).unwrap();
    }
    s
}

fn queue_ids(s: &Session) -> Vec<PlayerId> {
    s.queue.iter().map(|p| p.id).collect()
}

/// Every known player id must live in exactly one of queue, staging slot or a
/// court roster - never zero places, never more than one.
fn assert_placement_exclusive(s: &Session, expected: &[PlayerId]) {
    let mut seen: Vec<PlayerId> = s.queue.iter().map(|p| p.id).collect();
    if let Some(staged) = &s.next_game {
        seen.extend(staged.players.iter().map(|p| p.id));
    }
    for roster in s.court_rosters.values() {
        seen.extend(roster.iter().map(|p| p.id));
    }
    let unique: HashSet<PlayerId> = seen.iter().copied().collect();
    assert_eq!(seen.len(), unique.len(), "a player id appears in two places");
    let expected_set: HashSet<PlayerId> = expected.iter().copied().collect();
    assert_eq!(unique, expected_set, "players were lost or invented");
}

#[test]
fn generate_requires_four_active_players() {
    let mut s = session_with_players(3);
    assert!(matches!(
        generate_next_game(&mut s),
        Err(SessionError::NotEnoughPlayers)
    ));
}

#[test]
fn generate_moves_four_players_into_staging() {
    let mut s = session_with_players(6);
    generate_next_game(&mut s).unwrap();
    assert_eq!(s.next_game.as_ref().unwrap().players.len(), 4);
    assert_eq!(s.queue.len(), 2);
    assert_placement_exclusive(&s, &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn generate_with_a_game_already_staged_is_rejected() {
    let mut s = session_with_players(8);
    generate_next_game(&mut s).unwrap();
    assert!(matches!(
        generate_next_game(&mut s),
        Err(SessionError::InvalidState)
    ));
}

#[test]
fn manual_selection_drops_resting_players_and_needs_four() {
    let mut s = session_with_players(5);
    s.set_resting(2, true).unwrap();
    assert!(matches!(
        select_players_manually(&mut s, &[1, 2, 3, 4]),
        Err(SessionError::WrongNumberOfPlayers {
            needed: 4,
            selected: 3
        })
    ));
    assert!(s.next_game.is_none());
}

#[test]
fn manual_selection_may_split_a_pair_but_leaves_an_advisory() {
    let mut s = session_with_players(6);
    add_pair(&mut s, 1, 2).unwrap();
    select_players_manually(&mut s, &[1, 3, 4, 5]).unwrap();

    let staged_ids: Vec<PlayerId> =
        s.next_game.as_ref().unwrap().players.iter().map(|p| p.id).collect();
    assert!(staged_ids.contains(&1) && !staged_ids.contains(&2));
    let advisories = s.take_advisories();
    assert_eq!(advisories.len(), 1);
    // One-shot: a second read returns nothing.
    assert!(s.take_advisories().is_empty());
}

#[test]
fn clearing_an_empty_staging_slot_is_a_noop() {
    let mut s = session_with_players(4);
    clear_next_game(&mut s);
    assert_eq!(queue_ids(&s), vec![1, 2, 3, 4]);
}

#[test]
fn clearing_returns_players_to_their_original_spots() {
    let mut s = session_with_players(6);
    select_players_manually(&mut s, &[2, 4, 5, 6]).unwrap();
    assert_eq!(queue_ids(&s), vec![1, 3]);

    clear_next_game(&mut s);
    assert!(s.next_game.is_none());
    assert_eq!(queue_ids(&s), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn assignment_round_trips_all_four_players() {
    let mut s = session_with_players(4);
    generate_next_game(&mut s).unwrap();
    assign_to_court(&mut s, 1).unwrap();

    let court = s.court(1).unwrap();
    assert!(!court.is_available());
    assert_eq!(court.players.len(), 4);
    let roster_ids: HashSet<PlayerId> =
        s.court_rosters.get(&1).unwrap().iter().map(|p| p.id).collect();
    let view_ids: HashSet<PlayerId> = court.players.iter().map(|p| p.id).collect();
    assert_eq!(roster_ids, view_ids);

    end_game(&mut s, 1, &[]).unwrap();
    assert!(s.court(1).unwrap().is_available());
    assert!(s.court_rosters.is_empty());
    assert_eq!(
        queue_ids(&s).into_iter().collect::<HashSet<_>>(),
        HashSet::from([1, 2, 3, 4])
    );
    assert_placement_exclusive(&s, &[1, 2, 3, 4]);
}

#[test]
fn winners_requeue_before_losers() {
    let mut s = session_with_players(4);
    select_players_manually(&mut s, &[1, 2, 3, 4]).unwrap();
    assign_to_court(&mut s, 1).unwrap();
    end_game(&mut s, 1, &[2, 3]).unwrap();

    // Winners first, then losers, both keeping their relative order.
    assert_eq!(queue_ids(&s), vec![2, 3, 1, 4]);
    let p2 = s.find_waiting(2).unwrap();
    assert_eq!((p2.session_wins, p2.total_wins), (1, 1));
    let p1 = s.find_waiting(1).unwrap();
    assert_eq!((p1.session_losses, p1.total_losses), (1, 1));
}

#[test]
fn score_keeping_disabled_requeues_in_court_order() {
    let mut s = Session::new(SessionConfig {
        score_keeping_enabled: false,
        ..SessionConfig::default()
    });
    for i in 1..=4 {
        s.add_player(format!("P{i}"), Gender::Male, false).unwrap();
    }
    select_players_manually(&mut s, &[1, 2, 3, 4]).unwrap();
    assign_to_court(&mut s, 1).unwrap();
    end_game(&mut s, 1, &[2, 3]).unwrap();

    assert_eq!(queue_ids(&s), vec![1, 2, 3, 4]);
    assert_eq!(s.find_waiting(2).unwrap().session_wins, 0);
}

#[test]
fn end_game_rejects_winners_not_on_the_court() {
    let mut s = session_with_players(6);
    select_players_manually(&mut s, &[1, 2, 3, 4]).unwrap();
    assign_to_court(&mut s, 1).unwrap();
    assert!(matches!(
        end_game(&mut s, 1, &[2, 6]),
        Err(SessionError::PlayerNotFound(6))
    ));
    // Nothing moved: the court still holds its four players.
    assert_eq!(s.court_rosters.get(&1).unwrap().len(), 4);
}

#[test]
fn assignment_preconditions_are_checked() {
    let mut s = session_with_players(8);
    assert!(matches!(
        assign_to_court(&mut s, 1),
        Err(SessionError::NoNextGame)
    ));

    select_players_manually(&mut s, &[1, 2, 3, 4]).unwrap();
    assert!(matches!(
        assign_to_court(&mut s, 99),
        Err(SessionError::CourtNotFound(99))
    ));
    assign_to_court(&mut s, 1).unwrap();

    select_players_manually(&mut s, &[5, 6, 7, 8]).unwrap();
    assert!(matches!(
        assign_to_court(&mut s, 1),
        Err(SessionError::CourtOccupied(1))
    ));
    assign_to_court(&mut s, 2).unwrap();
    assert_placement_exclusive(&s, &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn voiding_unwinds_the_pending_game_first() {
    let mut s = session_with_players(8);
    select_players_manually(&mut s, &[5, 6, 7, 8]).unwrap();
    assign_to_court(&mut s, 1).unwrap();
    select_players_manually(&mut s, &[1, 2, 3, 4]).unwrap();

    void_court_assignment(&mut s, 1).unwrap();

    // The pending game went back to its original queue spots first.
    assert_eq!(queue_ids(&s), vec![1, 2, 3, 4]);
    let staged = s.next_game.as_ref().unwrap();
    assert_eq!(staged.origin, StagedOrigin::Void);
    let staged_ids: Vec<PlayerId> = staged.players.iter().map(|p| p.id).collect();
    assert_eq!(staged_ids, vec![5, 6, 7, 8]);
    assert!(s.court(1).unwrap().is_available());

    // Voided players jump the queue on clear instead of taking old spots.
    clear_next_game(&mut s);
    assert_eq!(queue_ids(&s), vec![5, 6, 7, 8, 1, 2, 3, 4]);
    assert_placement_exclusive(&s, &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn voiding_rolls_back_history_and_activity() {
    let mut s = session_with_players(4);
    select_players_manually(&mut s, &[1, 2, 3, 4]).unwrap();
    assign_to_court(&mut s, 1).unwrap();
    assert_eq!(s.history.records.len(), 1);

    void_court_assignment(&mut s, 1).unwrap();
    assert!(s.history.records.is_empty());
    assert_eq!(s.activity.get(1).unwrap().games_played, 0);
    assert_eq!(s.next_game.as_ref().unwrap().origin, StagedOrigin::Void);
}

#[test]
fn players_in_a_game_cannot_leave_the_session() {
    let mut s = session_with_players(4);
    generate_next_game(&mut s).unwrap();
    let staged_id = s.next_game.as_ref().unwrap().players[0].id;
    assert!(matches!(
        s.remove_player(staged_id),
        Err(SessionError::InvalidState)
    ));
    assert!(matches!(
        s.remove_player(99),
        Err(SessionError::PlayerNotFound(99))
    ));
}

#[test]
fn new_session_returns_everyone_and_resets_counters() {
    let mut s = session_with_players(6);
    add_pair(&mut s, 5, 6).unwrap();
    select_players_manually(&mut s, &[1, 2, 3, 4]).unwrap();
    assign_to_court(&mut s, 1).unwrap();
    end_game(&mut s, 1, &[1, 2]).unwrap();
    select_players_manually(&mut s, &[5, 6, 1, 2]).unwrap();

    s.start_new_session();

    assert!(s.next_game.is_none());
    assert!(s.pairs.is_empty());
    assert!(s.courts.iter().all(|c| c.is_available()));
    assert_placement_exclusive(&s, &[1, 2, 3, 4, 5, 6]);
    let p1 = s.find_waiting(1).unwrap();
    assert_eq!(p1.session_wins, 0);
    assert_eq!(p1.total_wins, 1);
    assert!(s.activity.get(1).is_none());
}

#[test]
fn placement_stays_exclusive_across_a_full_evening() {
    let all: Vec<PlayerId> = (1..=10).collect();
    let mut s = session_with_players(10);

    generate_next_game(&mut s).unwrap();
    assert_placement_exclusive(&s, &all);
    assign_to_court(&mut s, 1).unwrap();
    assert_placement_exclusive(&s, &all);

    generate_next_game(&mut s).unwrap();
    assign_to_court(&mut s, 2).unwrap();
    assert_placement_exclusive(&s, &all);

    let court_one: Vec<PlayerId> =
        s.court_rosters.get(&1).unwrap().iter().map(|p| p.id).collect();
    end_game(&mut s, 1, &[court_one[0], court_one[1]]).unwrap();
    assert_placement_exclusive(&s, &all);

    generate_next_game(&mut s).unwrap();
    assert_placement_exclusive(&s, &all);
    void_court_assignment(&mut s, 2).unwrap();
    assert_placement_exclusive(&s, &all);
    clear_next_game(&mut s);
    assert_placement_exclusive(&s, &all);
    assert!(s.next_game.is_none());
}
