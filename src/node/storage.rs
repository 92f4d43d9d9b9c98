use crate::ring::{
    identity::{RingPosition, hash_identity},
    internode::messages::Record,
};
use actix_web::web::Bytes;
use dashmap::DashMap;

/// Identity a key hashes to; its owner is the successor of this position.
pub fn key_identity(key: &str) -> RingPosition {
    hash_identity(key)
}

/// Records owned by this node, keyed by their plain key.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    records: DashMap<String, Bytes>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, value: Bytes) {
        self.records.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.records.get(key).map(|value| value.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copies every record whose key identity satisfies `predicate`.
    pub fn select(&self, predicate: impl Fn(RingPosition) -> bool) -> Vec<Record> {
        self.records
            .iter()
            .filter(|entry| predicate(key_identity(entry.key())))
            .map(|entry| Record {
                key: entry.key().clone(),
                value: entry.value().to_vec(),
            })
            .collect()
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.select(|_| true)
    }

    pub fn absorb(&self, records: Vec<Record>) {
        for record in records {
            self.records.insert(record.key, Bytes::from(record.value));
        }
    }

    /// Removes `record` only if nobody overwrote it in the meantime.
    pub fn remove_unchanged(&self, record: &Record) -> bool {
        self.records
            .remove_if(&record.key, |_, value| value.as_ref() == record.value.as_slice())
            .is_some()
    }
}
