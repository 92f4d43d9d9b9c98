//! Chord ring membership and routing.
//!
//! Nodes and keys are placed on a 2^32 identifier ring by hashing their
//! address or key. A key belongs to the first node clockwise from it (its
//! successor), i.e. each node owns (predecessor, self].
//!
//! Every node only knows its successor, its predecessor and a finger table of
//! exponentially spaced shortcuts. Joins splice a node in next to its
//! successor; periodic stabilization repairs the rest. Pointers are eventually
//! consistent, so routing tolerates stale fingers and falls back to
//! successor hops.

pub mod fingers;
pub mod identity;
pub mod internode;
pub mod network;
pub mod peer;
pub mod state;
