use crate::{
    eager_env,
    error::ChordError,
    ring::{
        identity::{ID_BITS, RING_SIZE, RingPosition},
        network::get_first_network_address,
        peer::Peer,
    },
};
use std::time::Duration;

const DEFAULT_STABILIZE_INTERVAL_MS: u64 = 200;
const DEFAULT_FIX_FINGERS_INTERVAL_MS: u64 = 500;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_LOOKUP_HOPS: usize = 256;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// `host:port` other nodes and clients use to reach this node.
    pub address: String,
    /// Explicit ring identity; hashed from `address` when absent.
    pub node_id: Option<RingPosition>,
    pub finger_count: u32,
    pub bootstrap: Option<String>,
    pub stabilize_interval: Duration,
    pub fix_fingers_interval: Duration,
    pub request_timeout: Duration,
    pub max_lookup_hops: usize,
}

impl NodeConfig {
    pub fn new(address: impl Into<String>, finger_count: u32) -> Self {
        Self {
            address: address.into(),
            node_id: None,
            finger_count,
            bootstrap: None,
            stabilize_interval: Duration::from_millis(DEFAULT_STABILIZE_INTERVAL_MS),
            fix_fingers_interval: Duration::from_millis(DEFAULT_FIX_FINGERS_INTERVAL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            max_lookup_hops: DEFAULT_MAX_LOOKUP_HOPS,
        }
    }

    /// Builds the configuration from the environment.
    ///
    /// Call `eager_env::check_env` first so missing variables fail fast.
    pub fn from_env() -> Self {
        let host = eager_env::ADVERTISED_HOST
            .clone()
            .or_else(|| get_first_network_address().map(|ip| ip.to_string()))
            .unwrap_or_else(|| "127.0.0.1".to_string());

        let millis = |value: Option<u64>, default: u64| Duration::from_millis(value.unwrap_or(default));

        Self {
            address: format!("{}:{}", host, *eager_env::PORT),
            node_id: *eager_env::NODE_ID,
            finger_count: *eager_env::FINGER_TABLE_SIZE,
            bootstrap: eager_env::BOOTSTRAP_PEER.clone(),
            stabilize_interval: millis(
                *eager_env::STABILIZE_INTERVAL_MS,
                DEFAULT_STABILIZE_INTERVAL_MS,
            ),
            fix_fingers_interval: millis(
                *eager_env::FIX_FINGERS_INTERVAL_MS,
                DEFAULT_FIX_FINGERS_INTERVAL_MS,
            ),
            request_timeout: millis(*eager_env::REQUEST_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS),
            max_lookup_hops: eager_env::MAX_LOOKUP_HOPS.unwrap_or(DEFAULT_MAX_LOOKUP_HOPS),
        }
    }

    pub fn validate(&self) -> Result<(), ChordError> {
        let fail = |message: String| Err(ChordError::Configuration(message));

        if self.address.is_empty() || self.address.starts_with(':') {
            return fail(format!("invalid advertised address '{}'", self.address));
        }
        if self.finger_count > ID_BITS {
            return fail(format!(
                "finger table size {} exceeds the {ID_BITS}-bit identifier space",
                self.finger_count
            ));
        }
        if let Some(id) = self.node_id
            && id >= RING_SIZE
        {
            return fail(format!("node id {id} is outside the ring [0, {RING_SIZE})"));
        }
        if self.stabilize_interval.is_zero() || self.fix_fingers_interval.is_zero() {
            return fail("maintenance intervals must be positive".to_string());
        }
        if self.request_timeout.is_zero() {
            return fail("request timeout must be positive".to_string());
        }
        if self.max_lookup_hops == 0 {
            return fail("lookup hop bound must be positive".to_string());
        }

        Ok(())
    }

    pub fn local_peer(&self) -> Peer {
        match self.node_id {
            Some(id) => Peer::new(id, self.address.clone()),
            None => Peer::from_address(self.address.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NodeConfig::new("127.0.0.1:8000", 8);
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_oversized_finger_table() {
        assert!(NodeConfig::new("127.0.0.1:8000", 32).validate().is_ok());
        assert!(matches!(
            NodeConfig::new("127.0.0.1:8000", 33).validate(),
            Err(ChordError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_ring_identity() {
        let mut config = NodeConfig::new("127.0.0.1:8000", 0);
        config.node_id = Some(RING_SIZE);
        assert!(config.validate().is_err());

        config.node_id = Some(RING_SIZE - 1);
        assert!(config.validate().is_ok());
        assert_eq!(config.local_peer().id, RING_SIZE - 1);
    }

    #[test]
    fn test_rejects_zero_durations() {
        let mut config = NodeConfig::new("127.0.0.1:8000", 0);
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = NodeConfig::new("127.0.0.1:8000", 0);
        config.max_lookup_hops = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_peer_hashes_address() {
        let config = NodeConfig::new("127.0.0.1:8000", 0);
        assert_eq!(config.local_peer(), Peer::from_address("127.0.0.1:8000"));
    }
}
