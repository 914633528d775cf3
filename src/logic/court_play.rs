//! Court play: assigning the staged game to a court, ending games with
//! winner bookkeeping, and voiding assignments.

use crate::logic::next_game::requeue_staged;
use crate::models::{
    CourtId, CourtPlayer, Player, PlayerId, Session, SessionError, StagedGame, StagedOrigin,
};
use chrono::Utc;

/// Move the staged four onto an available court. The game is recorded in the
/// repeat history and the activity tracker at this point; the court itself
/// carries only the reduced player view, ids round-trip through the roster.
pub fn assign_to_court(session: &mut Session, court_id: CourtId) -> Result<(), SessionError> {
    if session.next_game.is_none() {
        return Err(SessionError::NoNextGame);
    }
    let court = session
        .court(court_id)
        .ok_or(SessionError::CourtNotFound(court_id))?;
    if !court.is_available() {
        return Err(SessionError::CourtOccupied(court_id));
    }
    let Some(staged) = session.next_game.take() else {
        return Err(SessionError::NoNextGame);
    };

    let players = staged.players;
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let now = Utc::now();
    session.history.record_game(&ids, now);
    session.activity.record_game(&ids, now);

    let view: Vec<CourtPlayer> = players.iter().map(CourtPlayer::from_player).collect();
    if let Some(court) = session.court_mut(court_id) {
        court.occupy(view);
    }
    session.court_rosters.insert(court_id, players);
    Ok(())
}

/// End the game on a court. With score keeping enabled and exactly two
/// winners (both from this court) every player's session and all-time record
/// is updated and the four rejoin the queue tail winners first; otherwise
/// they rejoin in court order, unscored. Relative order within winners and
/// within losers is preserved.
pub fn end_game(
    session: &mut Session,
    court_id: CourtId,
    winner_ids: &[PlayerId],
) -> Result<(), SessionError> {
    let court = session
        .court(court_id)
        .ok_or(SessionError::CourtNotFound(court_id))?;
    if court.is_available() {
        return Err(SessionError::CourtNotOccupied(court_id));
    }

    let scoring = session.config.score_keeping_enabled && winner_ids.len() == 2;
    if scoring {
        let roster = session
            .court_rosters
            .get(&court_id)
            .ok_or(SessionError::CourtNotOccupied(court_id))?;
        for &id in winner_ids {
            if !roster.iter().any(|p| p.id == id) {
                return Err(SessionError::PlayerNotFound(id));
            }
        }
    }

    let mut roster = session
        .court_rosters
        .remove(&court_id)
        .ok_or(SessionError::CourtNotOccupied(court_id))?;
    if scoring {
        let roster_ids: Vec<PlayerId> = roster.iter().map(|p| p.id).collect();
        session.history.record_winners(&roster_ids, winner_ids);
        for player in &mut roster {
            if winner_ids.contains(&player.id) {
                player.record_win();
            } else {
                player.record_loss();
            }
        }
        let (winners, losers): (Vec<Player>, Vec<Player>) = roster
            .into_iter()
            .partition(|p| winner_ids.contains(&p.id));
        // Winners rejoin first and wait less for their next game.
        session.queue.extend(winners);
        session.queue.extend(losers);
    } else {
        session.queue.extend(roster);
    }

    if let Some(court) = session.court_mut(court_id) {
        court.release();
    }
    Ok(())
}

/// Void a court assignment: the game is treated as never played. The court's
/// four take over the staging slot marked as void-origin, so a later clear
/// puts them at the front of the queue. A different game already staged is
/// first returned to the queue under its own origin rules, and the voided
/// game's history record and activity counts are rolled back.
pub fn void_court_assignment(session: &mut Session, court_id: CourtId) -> Result<(), SessionError> {
    let court = session
        .court(court_id)
        .ok_or(SessionError::CourtNotFound(court_id))?;
    if court.is_available() {
        return Err(SessionError::CourtNotOccupied(court_id));
    }
    let roster = session
        .court_rosters
        .remove(&court_id)
        .ok_or(SessionError::CourtNotOccupied(court_id))?;

    if let Some(pending) = session.next_game.take() {
        requeue_staged(session, pending);
    }

    let ids: Vec<PlayerId> = roster.iter().map(|p| p.id).collect();
    session.history.remove_last_for(&ids);
    session.activity.revert_game(&ids);

    if let Some(court) = session.court_mut(court_id) {
        court.release();
    }
    session.next_game = Some(StagedGame {
        players: roster,
        origin: StagedOrigin::Void,
        original_positions: Vec::new(),
    });
    Ok(())
}
