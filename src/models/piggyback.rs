//! Piggyback pairs: two players who must always be grouped together.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// An active pairing. The master is the player who initiated the pairing; only
/// the master side can break it up again.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PiggybackPair {
    pub master: PlayerId,
    pub partner: PlayerId,
    /// Queue index the master held before being moved next to the partner.
    /// Used to put the master back when the pair dissolves.
    pub master_origin_index: Option<usize>,
}

impl PiggybackPair {
    pub fn new(master: PlayerId, partner: PlayerId) -> Self {
        Self {
            master,
            partner,
            master_origin_index: None,
        }
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.master == id || self.partner == id
    }

    /// The other member of the pair, if `id` belongs to it.
    pub fn other(&self, id: PlayerId) -> Option<PlayerId> {
        if id == self.master {
            Some(self.partner)
        } else if id == self.partner {
            Some(self.master)
        } else {
            None
        }
    }

    /// True if exactly one member of this pair is in the given group - the
    /// hard integrity violation automated selection must never produce.
    pub fn split_by(&self, ids: &[PlayerId]) -> bool {
        ids.contains(&self.master) != ids.contains(&self.partner)
    }
}
