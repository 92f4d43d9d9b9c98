use crate::ring::peer::Peer;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Answer of a single node to "who is the successor of this identity".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupStep {
    /// `peer` is the successor.
    Found { peer: Peer },
    /// Ask `peer` next.
    Forward { peer: Peer },
}

/// A stored key and its value, hex-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    pub key: String,
    #[serde(with = "hex::serde")]
    #[schema(value_type = String)]
    pub value: Vec<u8>,
}

/// Sent by a joining node to its new successor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimResponse {
    /// The successor's predecessor before the claimant arrived.
    pub predecessor: Option<Peer>,
    /// Records the claimant now owns.
    pub records: Vec<Record>,
}

/// Sent by a leaving node to both of its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Departure {
    pub leaving: Peer,
    pub successor: Peer,
    pub predecessor: Option<Peer>,
}
