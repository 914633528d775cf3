//! Piggyback pair registry: pairing, unpairing and the queue repositioning
//! that keeps a pair adjacent.

use crate::models::{PiggybackPair, PlayerId, Session, SessionError};

/// Pair two waiting players. Pairing is exclusive: any pre-existing pair
/// containing either player is dropped first. The master's queue index is
/// recorded for later restoration, then the master is moved to sit
/// immediately before the partner.
pub fn add_pair(
    session: &mut Session,
    master: PlayerId,
    partner: PlayerId,
) -> Result<(), SessionError> {
    if !session.config.piggyback_enabled {
        return Err(SessionError::PiggybackDisabled);
    }
    if master == partner {
        return Err(SessionError::InvalidState);
    }
    let master_index = session
        .queue_position(master)
        .ok_or(SessionError::PlayerNotFound(master))?;
    let partner_index = session
        .queue_position(partner)
        .ok_or(SessionError::PlayerNotFound(partner))?;

    // Exclusive membership: existing pairs of either player dissolve silently.
    session
        .pairs
        .retain(|pair| !pair.contains(master) && !pair.contains(partner));

    let moved = session.queue.remove(master_index);
    // Removing the master shifted everything behind it one slot forward.
    let insert_at = if master_index < partner_index {
        partner_index - 1
    } else {
        partner_index
    };
    session.queue.insert(insert_at, moved);

    let mut pair = PiggybackPair::new(master, partner);
    pair.master_origin_index = Some(master_index);
    session.pairs.push(pair);
    Ok(())
}

/// Break up a pair. Only the master side can trigger this; a partner's id
/// does not match. The master returns to its recorded origin index, clamped
/// to the current queue length.
pub fn remove_pair_by_master(session: &mut Session, master: PlayerId) -> Result<(), SessionError> {
    let pos = session
        .pairs
        .iter()
        .position(|pair| pair.master == master)
        .ok_or(SessionError::PairNotFound(master))?;
    let pair = session.pairs.remove(pos);
    if let Some(origin) = pair.master_origin_index {
        if let Some(idx) = session.queue_position(master) {
            let player = session.queue.remove(idx);
            session.restore_to_index(player, origin);
        }
    }
    Ok(())
}

/// The active pair containing this player (master or partner side), if any.
pub fn find_pair_of(session: &Session, id: PlayerId) -> Option<PiggybackPair> {
    session.pair_of(id).copied()
}

/// Remove every pair and recorded origin position (used on session end).
pub fn clear_pairs(session: &mut Session) {
    session.pairs.clear();
}
