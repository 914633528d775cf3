//! Staging the next game: automatic generation, manual selection and clearing.

use crate::logic::selection;
use crate::models::{Player, PlayerId, Session, SessionError, StagedGame, StagedOrigin};

/// Run the selection engine and stage its pick. Valid only while no game is
/// staged; a failed search leaves the session untouched.
pub fn generate_next_game(session: &mut Session) -> Result<(), SessionError> {
    if session.next_game.is_some() {
        return Err(SessionError::InvalidState);
    }
    let eligible = session
        .queue
        .iter()
        .filter(|p| !p.resting)
        .take(session.config.pool_size)
        .count();
    if eligible < 4 {
        return Err(SessionError::NotEnoughPlayers);
    }
    let selected = selection::select_next_game(
        &session.queue,
        &session.pairs,
        &session.history,
        &session.activity,
        &session.config,
    );
    if selected.is_empty() {
        return Err(SessionError::NoValidCombination);
    }
    let ids: Vec<PlayerId> = selected.iter().map(|p| p.id).collect();
    stage_from_queue(session, &ids)
}

/// Stage a manually chosen game. Resting players are dropped from the
/// selection and exactly four active waiting players must remain. Splitting a
/// piggyback pair is tolerated here (manual override of the automated rule)
/// but leaves a one-shot advisory for the UI.
pub fn select_players_manually(
    session: &mut Session,
    player_ids: &[PlayerId],
) -> Result<(), SessionError> {
    if session.next_game.is_some() {
        return Err(SessionError::InvalidState);
    }
    let mut active: Vec<PlayerId> = Vec::new();
    for &id in player_ids {
        let player = session
            .find_waiting(id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        if !player.resting && !active.contains(&id) {
            active.push(id);
        }
    }
    if active.len() != 4 {
        return Err(SessionError::WrongNumberOfPlayers {
            needed: 4,
            selected: active.len(),
        });
    }
    if session.config.piggyback_enabled {
        let split = session
            .pairs
            .iter()
            .find(|pair| pair.split_by(&active))
            .copied();
        if let Some(pair) = split {
            let name_of = |id: PlayerId| {
                session
                    .find_waiting(id)
                    .map_or_else(|| format!("#{}", id), |p| p.name.clone())
            };
            let message = format!(
                "This selection splits the piggyback pair {} / {}",
                name_of(pair.master),
                name_of(pair.partner)
            );
            session.advisories.push(message);
        }
    }
    stage_from_queue(session, &active)
}

/// Clear the staged next game. Clearing an empty slot is a no-op. Players
/// return to their original queue positions, except a voided game's players
/// who jump to the front of the queue.
pub fn clear_next_game(session: &mut Session) {
    if let Some(staged) = session.next_game.take() {
        requeue_staged(session, staged);
    }
}

/// Put staged players back into the queue under their origin's rules.
pub(crate) fn requeue_staged(session: &mut Session, staged: StagedGame) {
    let StagedGame {
        players,
        origin,
        original_positions,
    } = staged;
    match origin {
        StagedOrigin::Void => {
            // Interrupted players jump the queue, keeping their order.
            for player in players.into_iter().rev() {
                session.queue.insert(0, player);
            }
        }
        StagedOrigin::Queue => {
            let mut indexed: Vec<(usize, Player)> = players
                .into_iter()
                .map(|p| {
                    let idx = original_positions
                        .iter()
                        .find(|(id, _)| *id == p.id)
                        .map_or(usize::MAX, |&(_, idx)| idx);
                    (idx, p)
                })
                .collect();
            // Reinsert lowest index first so recorded positions line up again.
            indexed.sort_by_key(|&(idx, _)| idx);
            for (idx, player) in indexed {
                session.restore_to_index(player, idx);
            }
        }
    }
}

/// Snapshot queue positions, pull the four players out and stage them.
fn stage_from_queue(session: &mut Session, ids: &[PlayerId]) -> Result<(), SessionError> {
    let mut original_positions = Vec::with_capacity(ids.len());
    for &id in ids {
        let idx = session
            .queue_position(id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        original_positions.push((id, idx));
    }
    let mut players = Vec::with_capacity(ids.len());
    for &id in ids {
        if let Some(idx) = session.queue_position(id) {
            players.push(session.queue.remove(idx));
        }
    }
    session.next_game = Some(StagedGame {
        players,
        origin: StagedOrigin::Queue,
        original_positions,
    });
    Ok(())
}
