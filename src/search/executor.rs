//! Query executor: composes a correlation index, the HKI, the primary
//! index, and the row store to answer guest-column predicates. Borrows
//! its dataset and index collaborators rather than owning them.

use crate::core::CorrelationIndex;
use crate::store::{HostIndex, PointerMode, PrimaryIndex, RowOffset, RowStore, TupleSchema};

/// Borrows every collaborator it needs; built fresh per query session,
/// never mutates any of them.
pub struct QueryExecutor<'a> {
    ci: &'a CorrelationIndex,
    host_index: &'a HostIndex,
    primary_index: &'a PrimaryIndex,
    row_store: &'a RowStore,
    schema: &'a TupleSchema,
    guest_col: crate::store::AttrId,
    pointer_mode: PointerMode,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(
        ci: &'a CorrelationIndex,
        host_index: &'a HostIndex,
        primary_index: &'a PrimaryIndex,
        row_store: &'a RowStore,
        schema: &'a TupleSchema,
        guest_col: crate::store::AttrId,
        pointer_mode: PointerMode,
    ) -> Self {
        QueryExecutor { ci, host_index, primary_index, row_store, schema, guest_col, pointer_mode }
    }

    fn resolve(&self, tuple_refs: impl IntoIterator<Item = u64>) -> Vec<RowOffset> {
        match self.pointer_mode {
            PointerMode::Physical => tuple_refs.into_iter().map(RowOffset).collect(),
            PointerMode::Logical => {
                let pks: Vec<u64> = tuple_refs.into_iter().collect();
                self.primary_index.lookup_batch(&pks)
            }
        }
    }

    fn residual_filter(&self, offsets: Vec<RowOffset>, accept: impl Fn(u64) -> bool) -> Vec<RowOffset> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for offset in offsets {
            if !seen.insert(offset) {
                continue;
            }
            let tuple = self.row_store.fetch(offset);
            let guest = self.schema.read_u64(tuple, self.guest_col);
            if accept(guest) {
                out.push(offset);
            }
        }
        out
    }

    /// Point predicate `G = g`.
    pub fn point_query(&self, guest: u64) -> Vec<RowOffset> {
        let (host_range, outlier_refs) = self.ci.lookup_point(guest);

        let mut tuple_refs: Vec<u64> = outlier_refs;
        if let Some(range) = host_range {
            tuple_refs.extend(self.host_index.lookup_range(range.lo, range.hi));
        }

        let offsets = self.resolve(tuple_refs);
        self.residual_filter(offsets, |g| g == guest)
    }

    /// Range predicate `g_lo <= G <= g_hi`.
    pub fn range_query(&self, guest_lo: u64, guest_hi: u64) -> Vec<RowOffset> {
        let (host_ranges, outlier_refs) = self.ci.lookup_range(guest_lo, guest_hi);

        let mut tuple_refs: Vec<u64> = outlier_refs;
        for range in host_ranges {
            tuple_refs.extend(self.host_index.lookup_range(range.lo, range.hi));
        }

        let offsets = self.resolve(tuple_refs);
        self.residual_filter(offsets, |g| g >= guest_lo && g <= guest_hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CIConfig, ModelKind};
    use crate::store::{AttrId, TupleRef};

    fn build_fixture() -> (TupleSchema, RowStore, PrimaryIndex, HostIndex, CorrelationIndex) {
        let mut schema = TupleSchema::new();
        schema.add_attr(8);
        schema.add_attr(8);
        schema.add_attr(8);

        let mut row_store = RowStore::new(&schema);
        let mut primary_index = PrimaryIndex::new();
        let mut host_index = HostIndex::new();
        let mut triples = Vec::new();

        for i in 0..200u64 {
            let mut tuple = Vec::new();
            tuple.extend_from_slice(&i.to_le_bytes());
            tuple.extend_from_slice(&i.to_le_bytes());
            tuple.extend_from_slice(&(i * 2).to_le_bytes());
            let offset = row_store.append(&tuple);

            primary_index.insert(i, offset);
            host_index.insert(i * 2, TupleRef::Logical(i));
            triples.push(crate::core::Triple::new(i, i * 2, i));
        }

        let config = CIConfig {
            fanout: 2,
            error_bound: 1,
            outlier_threshold: 0.1,
            min_node_size: 16,
            max_height: 10,
            model_kind: ModelKind::Interpolation,
        };
        let ci = CorrelationIndex::construct(triples, &config, PointerMode::Logical).unwrap();

        (schema, row_store, primary_index, host_index, ci)
    }

    #[test]
    fn point_query_returns_exact_match_after_residual_filter() {
        let (schema, row_store, primary_index, host_index, ci) = build_fixture();
        let executor = QueryExecutor::new(
            &ci,
            &host_index,
            &primary_index,
            &row_store,
            &schema,
            AttrId(1),
            PointerMode::Logical,
        );

        let results = executor.point_query(100);
        assert_eq!(results.len(), 1);
        let tuple = row_store.fetch(results[0]);
        assert_eq!(schema.read_u64(tuple, AttrId(1)), 100);
    }

    #[test]
    fn range_query_covers_every_point_in_interval() {
        let (schema, row_store, primary_index, host_index, ci) = build_fixture();
        let executor = QueryExecutor::new(
            &ci,
            &host_index,
            &primary_index,
            &row_store,
            &schema,
            AttrId(1),
            PointerMode::Logical,
        );

        let results = executor.range_query(50, 60);
        assert_eq!(results.len(), 11);
        let mut guests: Vec<u64> = results
            .iter()
            .map(|&offset| schema.read_u64(row_store.fetch(offset), AttrId(1)))
            .collect();
        guests.sort();
        assert_eq!(guests, (50..=60).collect::<Vec<_>>());
    }

    #[test]
    fn point_query_out_of_range_is_empty() {
        let (schema, row_store, primary_index, host_index, ci) = build_fixture();
        let executor = QueryExecutor::new(
            &ci,
            &host_index,
            &primary_index,
            &row_store,
            &schema,
            AttrId(1),
            PointerMode::Logical,
        );

        assert!(executor.point_query(9000).is_empty());
    }
}
