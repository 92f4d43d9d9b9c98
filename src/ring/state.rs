use crate::ring::{
    fingers::FingerTable,
    identity::{RingPosition, RingRange, in_open_interval},
    internode::messages::{Departure, LookupStep},
    peer::Peer,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Lifecycle {
    Standalone,
    Joining,
    Active,
    Crashed,
    Leaving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Joining,
    Leaving,
}

/// Ring pointers of one node.
///
/// Everything routing reads lives here so it can be guarded by a single lock.
/// The state never talks to the network; `ChordNode` drives it.
#[derive(Debug, Clone)]
pub struct RingState {
    local: Peer,
    successor: Peer,
    predecessor: Option<Peer>,
    fingers: FingerTable,
    transition: Option<Transition>,
}

impl RingState {
    pub fn new(local: Peer, finger_count: u32) -> Self {
        Self {
            fingers: FingerTable::new(local.id, finger_count),
            successor: local.clone(),
            predecessor: None,
            transition: None,
            local,
        }
    }

    pub fn successor(&self) -> &Peer {
        &self.successor
    }

    pub fn predecessor(&self) -> Option<&Peer> {
        self.predecessor.as_ref()
    }

    pub fn fingers(&self) -> &FingerTable {
        &self.fingers
    }

    pub fn fingers_mut(&mut self) -> &mut FingerTable {
        &mut self.fingers
    }

    pub fn is_standalone(&self) -> bool {
        self.successor == self.local && self.predecessor.is_none()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.transition {
            Some(Transition::Joining) => Lifecycle::Joining,
            Some(Transition::Leaving) => Lifecycle::Leaving,
            None if self.is_standalone() => Lifecycle::Standalone,
            None => Lifecycle::Active,
        }
    }

    pub fn begin(&mut self, transition: Transition) {
        self.transition = Some(transition);
    }

    pub fn finish(&mut self) {
        self.transition = None;
    }

    /// Back to a ring of one.
    pub fn reset(&mut self) {
        self.successor = self.local.clone();
        self.predecessor = None;
        self.fingers.clear();
    }

    /// Identities this node is responsible for, if its predecessor is known.
    pub fn owned_range(&self) -> Option<RingRange> {
        self.predecessor
            .as_ref()
            .map(|predecessor| RingRange::new(predecessor.id, self.local.id))
    }

    /// One step of the successor lookup for `id`, answered from local state.
    pub fn lookup_step(&self, id: RingPosition) -> LookupStep {
        if self.successor == self.local {
            return LookupStep::Found {
                peer: self.local.clone(),
            };
        }

        if self.owned_range().is_some_and(|range| range.contains(id)) {
            return LookupStep::Found {
                peer: self.local.clone(),
            };
        }

        if RingRange::new(self.local.id, self.successor.id).contains(id) {
            return LookupStep::Found {
                peer: self.successor.clone(),
            };
        }

        let next = self
            .fingers
            .closest_preceding(id)
            .unwrap_or(&self.successor)
            .clone();

        LookupStep::Forward { peer: next }
    }

    pub fn set_successor(&mut self, successor: Peer) {
        self.successor = successor;
    }

    /// Adopts `candidate` as successor if it sits between this node and the
    /// current successor. Returns whether it was adopted.
    pub fn consider_successor(&mut self, candidate: Peer) -> bool {
        if candidate == self.local || candidate == self.successor {
            return false;
        }

        if in_open_interval(candidate.id, self.local.id, self.successor.id) {
            self.successor = candidate;
            return true;
        }

        false
    }

    /// The notify rule: adopt `candidate` as predecessor if there is none or
    /// it sits between the current predecessor and this node.
    pub fn consider_predecessor(&mut self, candidate: Peer) -> bool {
        if candidate == self.local {
            return false;
        }

        let adopt = match &self.predecessor {
            None => true,
            Some(current) if *current == candidate => false,
            Some(current) => in_open_interval(candidate.id, current.id, self.local.id),
        };

        if adopt {
            self.predecessor = Some(candidate);
        }

        adopt
    }

    pub fn clear_predecessor(&mut self, address: &str) -> bool {
        if self
            .predecessor
            .as_ref()
            .is_some_and(|predecessor| predecessor.address == address)
        {
            self.predecessor = None;
            return true;
        }

        false
    }

    /// Splices a departing neighbour out of the ring.
    pub fn apply_departure(&mut self, departure: &Departure) {
        let leaving = &departure.leaving;

        if self.successor == *leaving {
            self.successor = if departure.successor == *leaving {
                self.local.clone()
            } else {
                departure.successor.clone()
            };
        }

        if self.predecessor.as_ref() == Some(leaving) {
            self.predecessor = departure
                .predecessor
                .clone()
                .filter(|peer| peer != leaving && *peer != self.local);
        }

        self.fingers.remove_peer(&leaving.address);
    }

    /// Replaces a successor that stopped answering with the closest reachable
    /// peer this node knows of, or itself.
    pub fn replace_failed_successor(&mut self) -> &Peer {
        let failed = self.successor.address.clone();
        self.fingers.mark_unreachable(&failed);
        self.clear_predecessor(&failed);

        self.successor = self
            .fingers
            .nearest_live(&failed)
            .or(self.predecessor.as_ref())
            .cloned()
            .unwrap_or_else(|| self.local.clone());

        &self.successor
    }

    /// Addresses of all distinct peers this node links to.
    pub fn neighbours(&self) -> Vec<String> {
        std::iter::once(&self.successor)
            .chain(self.predecessor.as_ref())
            .chain(self.fingers.targets())
            .filter(|peer| **peer != self.local)
            .map(|peer| peer.address.clone())
            .unique()
            .collect()
    }

    /// Known peers other than the successor, for diagnostics.
    pub fn others(&self) -> Vec<String> {
        self.predecessor
            .iter()
            .chain(self.fingers.targets())
            .filter(|peer| **peer != self.local && **peer != self.successor)
            .map(|peer| peer.address.clone())
            .unique()
            .collect()
    }
}
