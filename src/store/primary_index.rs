//! Dense ordered index over a table's primary key.
//!
//! A thin newtype over [`OrderedMultiMap`](super::ordered_map::OrderedMultiMap)
//! so primary-key lookups and host-value lookups
//! ([`HostIndex`](super::host_index::HostIndex)) aren't interchangeable at
//! the type level even though they share a backing structure.

use super::ordered_map::OrderedMultiMap;
use super::row_store::RowOffset;

#[derive(Debug, Clone, Default)]
pub struct PrimaryIndex {
    map: OrderedMultiMap,
}

impl PrimaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, primary_key: u64, offset: RowOffset) {
        self.map.insert(primary_key, offset.0);
    }

    pub fn lookup_point(&self, primary_key: u64) -> Vec<RowOffset> {
        self.map.lookup_point(primary_key).iter().map(|&o| RowOffset(o)).collect()
    }

    pub fn lookup_range(&self, lo: u64, hi: u64) -> Vec<RowOffset> {
        self.map.lookup_range(lo, hi).into_iter().map(RowOffset).collect()
    }

    /// Point lookups for every key in `primary_keys`, concatenated in order.
    pub fn lookup_batch(&self, primary_keys: &[u64]) -> Vec<RowOffset> {
        self.map.lookup_batch(primary_keys).into_iter().map(RowOffset).collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
