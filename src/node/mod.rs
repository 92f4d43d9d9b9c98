pub mod fault;
pub mod maintenance;
pub mod storage;

use crate::{
    config::NodeConfig,
    error::ChordError,
    node::{
        fault::FaultSimulator,
        storage::{KeyValueStore, key_identity},
    },
    ring::{
        identity::{RingPosition, RingRange},
        internode::{
            PeerClient,
            messages::{ClaimResponse, Departure, LookupStep, Record},
        },
        peer::Peer,
        state::{Lifecycle, RingState, Transition},
    },
};
use actix_web::web::Bytes;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use utoipa::ToSchema;

/// Attempts made to reach the owner of a key before giving up.
const FORWARD_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NodeInfo {
    pub node_hash: RingPosition,
    pub successor: String,
    pub others: Vec<String>,
    pub predecessor: Option<String>,
    pub state: Lifecycle,
}

/// One member of the ring.
///
/// Ring pointers sit behind `ring`, which is never held across a remote call.
/// Join, leave and the periodic maintenance rounds additionally serialize on
/// `transitions` so a node never applies two membership changes at once.
#[derive(Debug)]
pub struct ChordNode {
    local: Peer,
    config: NodeConfig,
    ring: Mutex<RingState>,
    transitions: Mutex<()>,
    store: KeyValueStore,
    fault: FaultSimulator,
    client: PeerClient,
    shutdown: Notify,
}

impl ChordNode {
    pub fn new(config: NodeConfig) -> Result<Self, ChordError> {
        config.validate()?;

        let local = config.local_peer();
        let client = PeerClient::new(config.request_timeout)?;

        info!(
            "node {} placed at {} with {} fingers",
            local.address, local.id, config.finger_count
        );

        Ok(Self {
            ring: Mutex::new(RingState::new(local.clone(), config.finger_count)),
            transitions: Mutex::new(()),
            store: KeyValueStore::new(),
            fault: FaultSimulator::new(),
            shutdown: Notify::new(),
            local,
            config,
            client,
        })
    }

    pub fn local(&self) -> &Peer {
        &self.local
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn fault(&self) -> &FaultSimulator {
        &self.fault
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    pub async fn successor(&self) -> Peer {
        self.ring.lock().await.successor().clone()
    }

    pub async fn predecessor(&self) -> Option<Peer> {
        self.ring.lock().await.predecessor().cloned()
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        if self.fault.is_crashed() {
            return Lifecycle::Crashed;
        }
        self.ring.lock().await.lifecycle()
    }

    pub async fn node_info(&self) -> NodeInfo {
        let state = self.lifecycle().await;
        let ring = self.ring.lock().await;

        NodeInfo {
            node_hash: self.local.id,
            successor: ring.successor().address.clone(),
            others: ring.others(),
            predecessor: ring.predecessor().map(|peer| peer.address.clone()),
            state,
        }
    }

    pub async fn neighbours(&self) -> Vec<String> {
        self.ring.lock().await.neighbours()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await
    }

    pub async fn lookup_step(&self, id: RingPosition) -> LookupStep {
        self.ring.lock().await.lookup_step(id)
    }

    async fn mark_unreachable(&self, address: &str) {
        self.ring.lock().await.fingers_mut().mark_unreachable(address);
    }

    /// Resolves the node owning `id`, starting at this node.
    pub async fn find_successor(&self, id: RingPosition) -> Result<Peer, ChordError> {
        self.find_successor_from(&self.local.address, id).await
    }

    /// Iterative lookup: the origin asks one node per hop until some node
    /// answers `found`. A failing hop is marked unreachable and the walk
    /// restarts from `origin` once.
    async fn find_successor_from(
        &self,
        origin: &str,
        id: RingPosition,
    ) -> Result<Peer, ChordError> {
        let mut current = origin.to_string();
        let mut restarted = false;

        for hop in 0..self.config.max_lookup_hops {
            let step = if current == self.local.address {
                Ok(self.lookup_step(id).await)
            } else {
                self.client.lookup_step(&current, id).await
            };

            let failure = match step {
                Ok(LookupStep::Found { peer }) if current != origin && peer.address == current => {
                    // A forwarded hop precedes `id`, so it can only claim it
                    // when it is alone: it left the ring.
                    ChordError::RoutingFailure(format!("{current} is no longer a ring member"))
                }
                Ok(LookupStep::Found { peer }) => {
                    debug!("{id} resolved to {peer} after {} hops", hop + 1);
                    return Ok(peer);
                }
                Ok(LookupStep::Forward { peer }) if peer.address == current => {
                    return Err(ChordError::RoutingFailure(format!(
                        "{current} forwarded the lookup of {id} to itself"
                    )));
                }
                Ok(LookupStep::Forward { peer }) => {
                    current = peer.address;
                    continue;
                }
                Err(error) => error,
            };

            if current == origin || restarted {
                return Err(failure);
            }

            warn!("lookup of {id} failed at hop {hop}: {failure}");
            self.mark_unreachable(&current).await;
            restarted = true;
            current = origin.to_string();
        }

        Err(ChordError::RoutingFailure(format!(
            "no owner found for {id} within {} hops",
            self.config.max_lookup_hops
        )))
    }

    pub async fn put(&self, key: &str, value: Bytes) -> Result<(), ChordError> {
        let id = key_identity(key);
        let mut last_error = None;

        for attempt in 0..FORWARD_ATTEMPTS {
            if attempt > 0 {
                retry_pause().await;
            }

            let owner = match self.find_successor(id).await {
                Ok(owner) => owner,
                Err(error) => {
                    warn!("resolving the owner of {key} failed: {error}");
                    last_error = Some(error);
                    continue;
                }
            };
            if owner == self.local {
                self.store.put(key, value);
                return Ok(());
            }

            match self.client.store_record(&owner.address, key, value.clone()).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    warn!("storing {key} at {owner} failed: {error}");
                    self.mark_unreachable(&owner.address).await;
                    last_error = Some(error);
                }
            }
        }

        Err(routing_failure(key, last_error))
    }

    pub async fn get(&self, key: &str) -> Result<Bytes, ChordError> {
        let id = key_identity(key);
        let mut last_error = None;

        for attempt in 0..FORWARD_ATTEMPTS {
            if attempt > 0 {
                retry_pause().await;
            }

            let owner = match self.find_successor(id).await {
                Ok(owner) => owner,
                Err(error) => {
                    warn!("resolving the owner of {key} failed: {error}");
                    last_error = Some(error);
                    continue;
                }
            };
            let value = if owner == self.local {
                Ok(self.store.get(key))
            } else {
                self.client.fetch_record(&owner.address, key).await
            };

            match value {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => return Err(ChordError::NotFound(key.to_string())),
                Err(error) => {
                    warn!("fetching {key} from {owner} failed: {error}");
                    self.mark_unreachable(&owner.address).await;
                    last_error = Some(error);
                }
            }
        }

        Err(routing_failure(key, last_error))
    }

    /// Joins the ring `bootstrap` belongs to.
    ///
    /// On success the successor is set and the keys this node now owns have
    /// been moved in; on failure the node is standalone again.
    pub async fn join(&self, bootstrap: &str) -> Result<(), ChordError> {
        let _transition = self.transitions.lock().await;

        if bootstrap == self.local.address {
            return Ok(());
        }

        {
            let mut ring = self.ring.lock().await;
            if !ring.is_standalone() {
                return Err(ChordError::AlreadyMember);
            }
            ring.begin(Transition::Joining);
        }

        let result = self.splice_in(bootstrap).await;

        let mut ring = self.ring.lock().await;
        ring.finish();

        match &result {
            Ok(()) => info!("joined ring via {bootstrap}, successor {}", ring.successor()),
            Err(error) => {
                warn!("joining via {bootstrap} failed: {error}");
                ring.reset();
            }
        }

        result
    }

    async fn splice_in(&self, bootstrap: &str) -> Result<(), ChordError> {
        let successor = self.find_successor_from(bootstrap, self.local.id).await?;

        if successor.id == self.local.id {
            return Err(ChordError::Configuration(format!(
                "identity {} is already taken by {}",
                self.local.id, successor.address
            )));
        }

        let claim = self.client.claim(&successor.address, &self.local).await?;

        // Everything between the old predecessor of `successor` and us is ours now.
        let owned = match &claim.predecessor {
            Some(predecessor) => RingRange::new(predecessor.id, self.local.id),
            None => RingRange::new(successor.id, self.local.id),
        };
        let strays = self.store.select(|id| !owned.contains(id));

        let claimed = claim.records;
        self.store.absorb(claimed.clone());
        self.ring.lock().await.set_successor(successor.clone());

        if let Some(predecessor) = claim.predecessor
            && predecessor != self.local
            && let Err(error) = self.client.offer_successor(&predecessor.address, &self.local).await
        {
            warn!("could not announce ourselves to {predecessor}: {error}");
        }

        if !claimed.is_empty() {
            info!("took over {} records from {successor}", claimed.len());

            if let Err(error) = self.client.release(&successor.address, &claimed).await {
                warn!("{successor} did not release {} migrated records: {error}", claimed.len());
            }
        }

        if !strays.is_empty() {
            self.disperse(strays).await;
        }

        Ok(())
    }

    /// Pushes records stored before joining to the members that own them now.
    ///
    /// A record that cannot be placed stays here.
    async fn disperse(&self, records: Vec<Record>) {
        let total = records.len();
        let mut moved = 0;

        for record in records {
            let owner = match self.find_successor(key_identity(&record.key)).await {
                Ok(owner) if owner != self.local => owner,
                Ok(_) => continue,
                Err(error) => {
                    warn!("keeping {}, its owner is unknown: {error}", record.key);
                    continue;
                }
            };

            let value = Bytes::from(record.value.clone());
            match self.client.store_record(&owner.address, &record.key, value).await {
                Ok(()) => {
                    if self.store.remove_unchanged(&record) {
                        moved += 1;
                    }
                }
                Err(error) => warn!("keeping {}, {owner} refused it: {error}", record.key),
            }
        }

        info!("pushed {moved} of {total} records stored before joining to their owners");
    }

    /// Leaves the ring, handing every record to the successor.
    ///
    /// Neighbours are told best-effort. If the handoff fails the records stay
    /// here and the error is returned, but the node still leaves.
    pub async fn leave(&self) -> Result<(), ChordError> {
        let _transition = self.transitions.lock().await;

        let (successor, predecessor) = {
            let mut ring = self.ring.lock().await;
            if ring.is_standalone() {
                return Ok(());
            }
            ring.begin(Transition::Leaving);
            (ring.successor().clone(), ring.predecessor().cloned())
        };

        let handoff = self.hand_off(&successor).await;

        let departure = Departure {
            leaving: self.local.clone(),
            successor: successor.clone(),
            predecessor: predecessor.clone(),
        };

        let neighbours: Vec<&Peer> = [Some(&successor), predecessor.as_ref()]
            .into_iter()
            .flatten()
            .filter(|peer| **peer != self.local)
            .collect();

        let departure = &departure;
        let notifications = neighbours.into_iter().map(|peer| async move {
            if let Err(error) = self.client.depart(&peer.address, departure).await {
                warn!("could not tell {peer} about our departure: {error}");
            }
        });
        futures::future::join_all(notifications).await;

        let mut ring = self.ring.lock().await;
        ring.reset();
        ring.finish();
        info!("left the ring");

        handoff
    }

    async fn hand_off(&self, successor: &Peer) -> Result<(), ChordError> {
        if *successor == self.local {
            return Ok(());
        }

        let records = self.store.snapshot();
        if records.is_empty() {
            return Ok(());
        }

        match self.client.handoff(&successor.address, &records).await {
            Ok(()) => {
                let moved = records
                    .iter()
                    .filter(|record| self.store.remove_unchanged(record))
                    .count();
                info!("handed {moved} records to {successor}");
                Ok(())
            }
            Err(error) => {
                error!(
                    "handing {} records to {successor} failed, keeping them: {error}",
                    records.len()
                );
                Err(error)
            }
        }
    }

    /// Verifies the successor and announces ourselves to it.
    pub async fn stabilize(&self) -> Result<(), ChordError> {
        let Ok(_transition) = self.transitions.try_lock() else {
            return Ok(());
        };

        let successor = self.successor().await;

        let candidate = if successor == self.local {
            self.predecessor().await
        } else {
            match self.client.predecessor(&successor.address).await {
                Ok(candidate) => candidate,
                Err(error) => {
                    let replacement = self.ring.lock().await.replace_failed_successor().clone();
                    warn!("successor {successor} failed ({error}), falling back to {replacement}");
                    return Ok(());
                }
            }
        };

        let successor = {
            let mut ring = self.ring.lock().await;
            if let Some(candidate) = candidate
                && ring.consider_successor(candidate)
            {
                info!("adopted successor {}", ring.successor());
            }
            ring.successor().clone()
        };

        if successor != self.local {
            self.client.notify(&successor.address, &self.local).await?;
        }

        Ok(())
    }

    /// Forgets a predecessor that stopped answering.
    pub async fn check_predecessor(&self) {
        let Some(predecessor) = self.predecessor().await else {
            return;
        };

        if let Err(error) = self.client.ping(&predecessor.address).await
            && self.ring.lock().await.clear_predecessor(&predecessor.address)
        {
            warn!("predecessor {predecessor} is gone: {error}");
        }
    }

    /// Recomputes every finger entry.
    pub async fn fix_fingers(&self) {
        let Ok(_transition) = self.transitions.try_lock() else {
            return;
        };

        let starts: Vec<RingPosition> = {
            let ring = self.ring.lock().await;
            (0..ring.fingers().len()).map(|i| ring.fingers().start(i)).collect()
        };

        for (index, start) in starts.into_iter().enumerate() {
            match self.find_successor(start).await {
                Ok(peer) => self.ring.lock().await.fingers_mut().set(index, peer),
                Err(error) => debug!("finger {index} ({start}) not refreshed: {error}"),
            }
        }

        self.ring.lock().await.fingers_mut().forget_unreachable();
    }

    pub async fn notify(&self, candidate: Peer) {
        let mut ring = self.ring.lock().await;
        if ring.consider_predecessor(candidate) {
            debug!("adopted predecessor {:?}", ring.predecessor());
        }
    }

    pub async fn offer_successor(&self, candidate: Peer) {
        let mut ring = self.ring.lock().await;
        if ring.consider_successor(candidate) {
            info!("adopted successor {}", ring.successor());
        }
    }

    /// A node joining right before us asks for the records it now owns.
    ///
    /// Records are only copied; they are dropped once the claimant calls
    /// [`Self::release`].
    pub async fn claim(&self, claimant: Peer) -> ClaimResponse {
        let predecessor = {
            let mut ring = self.ring.lock().await;
            let previous = ring.predecessor().cloned();
            ring.consider_predecessor(claimant.clone());
            ring.consider_successor(claimant.clone());
            previous
        };

        let kept = RingRange::new(claimant.id, self.local.id);
        let records = self.store.select(|id| !kept.contains(id));

        info!("{claimant} joined before us and claims {} records", records.len());

        ClaimResponse {
            predecessor,
            records,
        }
    }

    /// Drops claimed records, except those overwritten since the claim.
    pub fn release(&self, records: &[Record]) -> usize {
        records
            .iter()
            .filter(|record| self.store.remove_unchanged(record))
            .count()
    }

    pub fn accept_handoff(&self, records: Vec<Record>) {
        info!("received {} records from a departing node", records.len());
        self.store.absorb(records);
    }

    pub async fn apply_departure(&self, departure: &Departure) {
        let mut ring = self.ring.lock().await;
        ring.apply_departure(departure);
        info!(
            "{} left, successor {} predecessor {:?}",
            departure.leaving,
            ring.successor(),
            ring.predecessor().map(|peer| &peer.address)
        );
    }
}

async fn retry_pause() {
    let jitter = rand::random_range(20..80);
    tokio::time::sleep(Duration::from_millis(jitter)).await;
}

fn routing_failure(key: &str, last_error: Option<ChordError>) -> ChordError {
    ChordError::RoutingFailure(match last_error {
        Some(error) => format!("owner of {key} unreachable: {error}"),
        None => format!("owner of {key} unreachable"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::identity::RING_SIZE;
    use httpmock::prelude::*;
    use serde_json::json;

    fn node(address: &str, finger_count: u32) -> ChordNode {
        ChordNode::new(NodeConfig::new(address, finger_count)).unwrap()
    }

    fn node_at(address: &str, id: RingPosition) -> ChordNode {
        let mut config = NodeConfig::new(address, 0);
        config.node_id = Some(id);
        ChordNode::new(config).unwrap()
    }

    fn dead_address() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    }

    fn peer_json(id: RingPosition, address: &str) -> serde_json::Value {
        json!({ "id": id, "address": address })
    }

    #[tokio::test]
    async fn test_new_node_is_standalone() {
        let node = node("127.0.0.1:9001", 4);

        let info = node.node_info().await;
        assert_eq!(info.successor, "127.0.0.1:9001");
        assert!(info.others.is_empty());
        assert_eq!(info.predecessor, None);
        assert_eq!(info.state, Lifecycle::Standalone);
    }

    #[tokio::test]
    async fn test_lone_node_owns_everything() {
        let node = node("127.0.0.1:9002", 0);

        assert_eq!(node.find_successor(0).await.unwrap(), *node.local());
        assert_eq!(node.find_successor(123_456).await.unwrap(), *node.local());

        node.put("key", Bytes::from_static(b"value")).await.unwrap();
        assert_eq!(node.get("key").await.unwrap(), Bytes::from_static(b"value"));
        assert!(matches!(
            node.get("other").await,
            Err(ChordError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_leave_when_standalone_is_noop() {
        let node = node("127.0.0.1:9003", 2);
        node.put("k", Bytes::from_static(b"v")).await.unwrap();

        node.leave().await.unwrap();
        node.leave().await.unwrap();

        assert_eq!(node.lifecycle().await, Lifecycle::Standalone);
        assert_eq!(node.store().len(), 1);
    }

    #[tokio::test]
    async fn test_join_self_is_noop() {
        let node = node("127.0.0.1:9004", 2);
        node.join("127.0.0.1:9004").await.unwrap();
        assert_eq!(node.lifecycle().await, Lifecycle::Standalone);
    }

    #[tokio::test]
    async fn test_join_unreachable_bootstrap_stays_standalone() {
        let dead = dead_address();

        let node = node("127.0.0.1:9005", 2);
        let result = node.join(&dead).await;

        assert!(matches!(result, Err(ChordError::UnreachablePeer { .. })));
        assert_eq!(node.lifecycle().await, Lifecycle::Standalone);
        assert_eq!(node.successor().await, *node.local());
    }

    #[tokio::test]
    async fn test_claim_hands_over_keys_outside_kept_range() {
        let node = node("127.0.0.1:9006", 0);
        for i in 0..50 {
            node.store().put(&format!("key-{i}"), Bytes::from(format!("v{i}")));
        }

        let claimant = Peer::new(
            (node.local().id + RING_SIZE / 2) % RING_SIZE,
            "127.0.0.1:9999",
        );
        let response = node.claim(claimant.clone()).await;

        assert_eq!(response.predecessor, None);
        let kept = RingRange::new(claimant.id, node.local().id);
        for record in &response.records {
            assert!(!kept.contains(key_identity(&record.key)));
        }

        // the claimant is now both neighbours of a formerly lone node
        assert_eq!(node.predecessor().await, Some(claimant.clone()));
        assert_eq!(node.successor().await, claimant);

        // nothing is dropped before release
        assert_eq!(node.store().len(), 50);
        assert_eq!(node.release(&response.records), response.records.len());
        assert_eq!(node.store().len(), 50 - response.records.len());
    }

    #[tokio::test]
    async fn test_release_keeps_values_written_after_claim() {
        let node = node("127.0.0.1:9008", 0);
        for i in 0..50 {
            node.store().put(&format!("key-{i}"), Bytes::from(format!("v{i}")));
        }

        let claimant = Peer::new(
            (node.local().id + RING_SIZE / 2) % RING_SIZE,
            "127.0.0.1:9999",
        );
        let response = node.claim(claimant).await;
        assert!(response.records.len() >= 2, "claim too small to be meaningful");

        // a put reaches the old owner between claim and release
        let rewritten = &response.records[0].key;
        node.store().put(rewritten, Bytes::from_static(b"newer"));

        let released = node.release(&response.records);

        assert_eq!(released, response.records.len() - 1);
        assert_eq!(node.store().get(rewritten), Some(Bytes::from_static(b"newer")));
        for record in &response.records[1..] {
            assert_eq!(node.store().get(&record.key), None);
        }
    }

    #[tokio::test]
    async fn test_crash_is_reported_in_lifecycle() {
        let node = node("127.0.0.1:9007", 0);
        node.fault().crash();
        assert_eq!(node.lifecycle().await, Lifecycle::Crashed);
        node.fault().recover();
        assert_eq!(node.lifecycle().await, Lifecycle::Standalone);
    }

    #[tokio::test]
    async fn test_lookup_gives_up_after_hop_bound() {
        let a = MockServer::start_async().await;
        let b = MockServer::start_async().await;
        let (a_address, b_address) = (a.address().to_string(), b.address().to_string());

        let a_mock = a
            .mock_async(|when, then| {
                when.method(GET).path("/ring/step/5000");
                then.status(200)
                    .json_body(json!({ "kind": "forward", "peer": peer_json(20, &b_address) }));
            })
            .await;
        let b_mock = b
            .mock_async(|when, then| {
                when.method(GET).path("/ring/step/5000");
                then.status(200)
                    .json_body(json!({ "kind": "forward", "peer": peer_json(10, &a_address) }));
            })
            .await;

        let mut config = NodeConfig::new("127.0.0.1:9010", 0);
        config.max_lookup_hops = 6;
        let node = ChordNode::new(config).unwrap();

        let result = node.find_successor_from(&a_address, 5000).await;

        assert!(matches!(result, Err(ChordError::RoutingFailure(_))));
        a_mock.assert_calls_async(3).await;
        b_mock.assert_calls_async(3).await;
    }

    #[tokio::test]
    async fn test_lookup_forwarded_to_itself_fails() {
        let server = MockServer::start_async().await;
        let address = server.address().to_string();
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ring/step/5000");
                then.status(200)
                    .json_body(json!({ "kind": "forward", "peer": peer_json(10, &address) }));
            })
            .await;

        let node = node("127.0.0.1:9011", 0);
        let result = node.find_successor_from(&address, 5000).await;

        assert!(matches!(result, Err(ChordError::RoutingFailure(_))));
    }

    #[tokio::test]
    async fn test_lookup_restarts_once_after_dead_hop() {
        let server = MockServer::start_async().await;
        let address = server.address().to_string();
        let dead = dead_address();

        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ring/step/5000");
                then.status(200)
                    .json_body(json!({ "kind": "forward", "peer": peer_json(4000, &dead) }));
            })
            .await;

        let node = node_at("127.0.0.1:9012", 100);
        node.ring.lock().await.set_successor(Peer::new(1000, address));

        let result = node.find_successor(5000).await;

        // the first walk fails at the dead hop, the restart fails there again
        assert!(matches!(result, Err(ChordError::UnreachablePeer { .. })));
        mock.assert_calls_async(2).await;
    }

    #[tokio::test]
    async fn test_lookup_treats_departed_hop_as_failed() {
        let server = MockServer::start_async().await;
        let address = server.address().to_string();

        // a node that left the ring answers for everything
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ring/step/5000");
                then.status(200)
                    .json_body(json!({ "kind": "found", "peer": peer_json(1000, &address) }));
            })
            .await;

        let node = node_at("127.0.0.1:9013", 100);
        node.ring.lock().await.set_successor(Peer::new(1000, address));

        let result = node.find_successor(5000).await;

        assert!(matches!(result, Err(ChordError::RoutingFailure(_))));
        mock.assert_calls_async(2).await;
    }

    #[tokio::test]
    async fn test_put_and_get_fail_when_owner_is_down() {
        let id = key_identity("lost");
        let node = node_at("127.0.0.1:9014", (id + RING_SIZE - 10) % RING_SIZE);
        node.ring.lock().await.set_successor(Peer::new(id, dead_address()));

        let put = node.put("lost", Bytes::from_static(b"value")).await;
        assert!(matches!(put, Err(ChordError::RoutingFailure(_))));
        assert!(node.store().is_empty());

        let get = node.get("lost").await;
        assert!(matches!(get, Err(ChordError::RoutingFailure(_))));
    }

    #[tokio::test]
    async fn test_put_forwards_to_owner() {
        let id = key_identity("remote");
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/ring/records/remote").body("value");
                then.status(200);
            })
            .await;

        let node = node_at("127.0.0.1:9015", (id + RING_SIZE - 10) % RING_SIZE);
        node.ring
            .lock()
            .await
            .set_successor(Peer::new(id, server.address().to_string()));

        node.put("remote", Bytes::from_static(b"value")).await.unwrap();

        mock.assert_async().await;
        assert!(node.store().is_empty());
    }
}
