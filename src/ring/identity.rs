use sha1::{Digest, Sha1};
use std::fmt::Display;

pub type RingPosition = u64;

/// Number of bits of the identifier space.
pub const ID_BITS: u32 = 32;

/// Identifiers live in `[0, RING_SIZE)`.
pub const RING_SIZE: RingPosition = 1 << ID_BITS;

/// Places arbitrary bytes on the ring.
///
/// The first eight bytes of the SHA-1 digest are read big-endian and reduced
/// modulo [`RING_SIZE`]. Node addresses and storage keys share this function,
/// so a key is owned by the successor of `hash_identity(key)`.
pub fn hash_identity(data: impl AsRef<[u8]>) -> RingPosition {
    let digest = Sha1::digest(data.as_ref());

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);

    RingPosition::from_be_bytes(prefix) % RING_SIZE
}

/// Start of the `index`-th finger interval: `(position + 2^index) mod 2^m`.
pub fn finger_start(position: RingPosition, index: u32) -> RingPosition {
    (position + (1 << index)) % RING_SIZE
}

/// Clockwise distance travelled from `from` to reach `to`.
pub fn distance(from: RingPosition, to: RingPosition) -> RingPosition {
    (to + RING_SIZE - from) % RING_SIZE
}

/// Whether `x` lies strictly between `start` and `end` going clockwise.
///
/// When `start == end` the interval is the whole ring except that point.
pub fn in_open_interval(x: RingPosition, start: RingPosition, end: RingPosition) -> bool {
    if start < end {
        start < x && x < end
    } else {
        x > start || x < end
    }
}

/// Represents a range on the ring (start, end].
///
/// The range is exclusive of `start` and inclusive of `end`, which is how
/// key ownership is expressed: a node owns `(predecessor, self]`.
/// When `end <= start`, the range wraps around the ring; `start == end`
/// covers the entire ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingRange {
    pub start: RingPosition,
    pub end: RingPosition,
}

impl RingRange {
    pub fn new(start: RingPosition, end: RingPosition) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, x: RingPosition) -> bool {
        if self.start < self.end {
            self.start < x && x <= self.end
        } else {
            x > self.start || x <= self.end
        }
    }
}

impl Display for RingRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_and_in_range() {
        let first = hash_identity("127.0.0.1:8000");
        let second = hash_identity("127.0.0.1:8000");
        assert_eq!(first, second);
        assert!(first < RING_SIZE);

        assert_ne!(hash_identity("127.0.0.1:8000"), hash_identity("127.0.0.1:8001"));
    }

    #[test]
    fn test_hash_known_value() {
        // sha1("") = da39a3ee 5e6b4b0d ...
        assert_eq!(hash_identity(""), 0x5e6b4b0d);
    }

    #[test]
    fn test_finger_start_wraps() {
        assert_eq!(finger_start(0, 0), 1);
        assert_eq!(finger_start(10, 3), 18);
        assert_eq!(finger_start(RING_SIZE - 1, 0), 0);
        assert_eq!(finger_start(RING_SIZE - 2, 31), (1 << 31) - 2);
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(10, 20), 10);
        assert_eq!(distance(20, 10), RING_SIZE - 10);
        assert_eq!(distance(5, 5), 0);
    }

    #[test]
    fn test_open_interval() {
        assert!(in_open_interval(5, 1, 10));
        assert!(!in_open_interval(1, 1, 10));
        assert!(!in_open_interval(10, 1, 10));

        // wrapping
        assert!(in_open_interval(RING_SIZE - 1, 100, 10));
        assert!(in_open_interval(0, 100, 10));
        assert!(!in_open_interval(50, 100, 10));

        // degenerate: everything but the point itself
        assert!(in_open_interval(3, 7, 7));
        assert!(!in_open_interval(7, 7, 7));
    }

    #[test]
    fn test_range_contains() {
        let range = RingRange::new(100, 200);
        assert!(!range.contains(100));
        assert!(range.contains(101));
        assert!(range.contains(200));
        assert!(!range.contains(201));

        // wrapping range
        let range = RingRange::new(200, 100);
        assert!(range.contains(RING_SIZE - 1));
        assert!(range.contains(0));
        assert!(range.contains(100));
        assert!(!range.contains(150));

        // single node covers the entire ring
        let range = RingRange::new(42, 42);
        assert!(range.contains(42));
        assert!(range.contains(0));
        assert!(range.contains(RING_SIZE - 1));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(RingRange::new(3, 9).to_string(), "(3,9]");
    }
}
