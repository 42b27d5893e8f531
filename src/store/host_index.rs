//! Host-Key-Ordered Index (HKI): a dense ordered index over the host
//! column's values, used as the ground truth a correlation index is
//! validated and benchmarked against.
//!
//! Maps host attribute values to tuple references, not row offsets
//! directly — resolving a logical ref to a row still goes through
//! the [`PrimaryIndex`](super::primary_index::PrimaryIndex). Shares its
//! backing structure with `PrimaryIndex` via
//! [`OrderedMultiMap`](super::ordered_map::OrderedMultiMap).

use super::ordered_map::OrderedMultiMap;
use super::tuple_ref::TupleRef;

#[derive(Debug, Clone, Default)]
pub struct HostIndex {
    map: OrderedMultiMap,
}

impl HostIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, host_value: u64, tuple_ref: TupleRef) {
        self.map.insert(host_value, tuple_ref.as_u64());
    }

    pub fn lookup_point(&self, host_value: u64) -> &[u64] {
        self.map.lookup_point(host_value)
    }

    pub fn lookup_range(&self, lo: u64, hi: u64) -> Vec<u64> {
        self.map.lookup_range(lo, hi)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
