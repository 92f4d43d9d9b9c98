use crate::ring::identity::{RingPosition, distance, finger_start, in_open_interval};
use crate::ring::peer::Peer;
use itertools::Itertools;
use std::collections::HashSet;

/// Routing accelerator: entry `i` points at the successor of `self + 2^i`.
///
/// Entries start empty and are filled by the periodic fix-up. Peers that
/// failed a forward are remembered as unreachable and skipped until the next
/// full fix-up pass forgets them.
#[derive(Debug, Clone)]
pub struct FingerTable {
    local: RingPosition,
    entries: Vec<Option<Peer>>,
    unreachable: HashSet<String>,
}

impl FingerTable {
    pub fn new(local: RingPosition, size: u32) -> Self {
        Self {
            local,
            entries: vec![None; size as usize],
            unreachable: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn start(&self, index: usize) -> RingPosition {
        finger_start(self.local, index as u32)
    }

    pub fn set(&mut self, index: usize, peer: Peer) {
        if let Some(entry) = self.entries.get_mut(index) {
            *entry = Some(peer);
        }
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|entry| *entry = None);
        self.unreachable.clear();
    }

    /// Drops every entry pointing at `address`.
    pub fn remove_peer(&mut self, address: &str) {
        for entry in &mut self.entries {
            if entry.as_ref().is_some_and(|peer| peer.address == address) {
                *entry = None;
            }
        }
    }

    pub fn mark_unreachable(&mut self, address: &str) {
        self.unreachable.insert(address.to_string());
    }

    pub fn forget_unreachable(&mut self) {
        self.unreachable.clear();
    }

    /// Farthest-reaching live entry strictly between this node and `target`.
    ///
    /// `None` means no finger helps and the caller should hop to its
    /// successor.
    pub fn closest_preceding(&self, target: RingPosition) -> Option<&Peer> {
        self.entries.iter().rev().flatten().find(|peer| {
            peer.id != self.local
                && !self.unreachable.contains(&peer.address)
                && in_open_interval(peer.id, self.local, target)
        })
    }

    /// Reachable entry closest clockwise after this node, skipping `excluded`.
    pub fn nearest_live(&self, excluded: &str) -> Option<&Peer> {
        self.entries
            .iter()
            .flatten()
            .filter(|peer| {
                peer.id != self.local
                    && peer.address != excluded
                    && !self.unreachable.contains(&peer.address)
            })
            .min_by_key(|peer| distance(self.local, peer.id))
    }

    /// Distinct peers currently referenced by the table.
    pub fn targets(&self) -> Vec<&Peer> {
        self.entries.iter().flatten().unique().collect()
    }
}
