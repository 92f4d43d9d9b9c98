use crate::ring::identity::{RingPosition, hash_identity};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use utoipa::ToSchema;

/// A ring entry: where a node sits on the ring and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Peer {
    pub id: RingPosition,
    /// `host:port` the node answers HTTP on.
    pub address: String,
}

impl Peer {
    pub fn new(id: RingPosition, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
        }
    }

    /// A peer whose identity is derived from its address.
    pub fn from_address(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            id: hash_identity(&address),
            address,
        }
    }
}

impl Ord for Peer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.address.cmp(&other.address))
    }
}

impl PartialOrd for Peer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.address, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_address_hashes_address() {
        let peer = Peer::from_address("10.0.0.1:8000");
        assert_eq!(peer.id, hash_identity("10.0.0.1:8000"));
        assert_eq!(peer.address, "10.0.0.1:8000");
    }

    #[test]
    fn test_ordering_by_position_then_address() {
        let a = Peer::new(5, "b:1");
        let b = Peer::new(5, "a:1");
        let c = Peer::new(1, "z:1");

        let mut peers = vec![a.clone(), b.clone(), c.clone()];
        peers.sort();
        assert_eq!(peers, vec![c, b, a]);
    }
}
