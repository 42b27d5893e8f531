//! Cross-module end-to-end scenarios wiring together `RowStore` +
//! `PrimaryIndex` + `HostIndex` + `CorrelationIndex` + `QueryExecutor`.
//! Placed under `tests/` rather than a `#[cfg(test)]` block because it
//! spans more than one crate-internal module.

use correlation_index::build::build_correlation_index;
use correlation_index::core::{CIConfig, ModelKind};
use correlation_index::search::QueryExecutor;
use correlation_index::store::{AttrId, HostIndex, PointerMode, PrimaryIndex, RowStore, TupleRef, TupleSchema};

struct Fixture {
    schema: TupleSchema,
    row_store: RowStore,
    primary_index: PrimaryIndex,
    host_index: HostIndex,
}

fn build_fixture(rows: &[(u64, u64)], pointer_mode: PointerMode) -> Fixture {
    let mut schema = TupleSchema::new();
    schema.add_attr(8); // primary key
    schema.add_attr(8); // guest
    schema.add_attr(8); // host

    let mut row_store = RowStore::new(&schema);
    let mut primary_index = PrimaryIndex::new();
    let mut host_index = HostIndex::new();

    for (pk, &(guest, host)) in rows.iter().enumerate() {
        let pk = pk as u64;
        let mut tuple = Vec::new();
        tuple.extend_from_slice(&pk.to_le_bytes());
        tuple.extend_from_slice(&guest.to_le_bytes());
        tuple.extend_from_slice(&host.to_le_bytes());
        let offset = row_store.append(&tuple);

        primary_index.insert(pk, offset);
        let tuple_ref = match pointer_mode {
            PointerMode::Physical => TupleRef::Physical(offset),
            PointerMode::Logical => TupleRef::Logical(pk),
        };
        host_index.insert(host, tuple_ref);
    }

    Fixture { schema, row_store, primary_index, host_index }
}

fn interpolation_config() -> CIConfig {
    CIConfig {
        fanout: 2,
        error_bound: 1,
        outlier_threshold: 0.1,
        min_node_size: 16,
        max_height: 10,
        model_kind: ModelKind::Interpolation,
    }
}

/// Scenario 1: dense linear data, root validates with slope=3, exact
/// single-tuple match.
#[test]
fn dense_linear_scenario() {
    let rows: Vec<(u64, u64)> = (0..1000u64).map(|i| (i, 3 * i)).collect();
    let fixture = build_fixture(&rows, PointerMode::Logical);

    let ci = build_correlation_index(
        &fixture.row_store,
        &fixture.schema,
        Some(AttrId(0)),
        AttrId(1),
        AttrId(2),
        PointerMode::Logical,
        &interpolation_config(),
    )
    .unwrap();

    assert_eq!(ci.node_count(), 1);

    let executor = QueryExecutor::new(
        &ci,
        &fixture.host_index,
        &fixture.primary_index,
        &fixture.row_store,
        &fixture.schema,
        AttrId(1),
        PointerMode::Logical,
    );

    let results = executor.point_query(500);
    assert_eq!(results.len(), 1);
    let tuple = fixture.row_store.fetch(results[0]);
    assert_eq!(fixture.schema.read_u64(tuple, AttrId(0)), 500);
}

/// Scenario 2: piecewise linear data forces a split; queries into either
/// region still resolve to the right tuple.
#[test]
fn piecewise_linear_scenario() {
    let rows: Vec<(u64, u64)> = (0..1000u64)
        .map(|i| {
            let host = if i < 667 { 2 * i } else { 5 * i };
            (i, host)
        })
        .collect();
    let fixture = build_fixture(&rows, PointerMode::Physical);

    let mut config = interpolation_config();
    config.fanout = 4;

    let ci = build_correlation_index(
        &fixture.row_store,
        &fixture.schema,
        None,
        AttrId(1),
        AttrId(2),
        PointerMode::Physical,
        &config,
    )
    .unwrap();
    assert!(ci.node_count() > 1);

    let executor = QueryExecutor::new(
        &ci,
        &fixture.host_index,
        &fixture.primary_index,
        &fixture.row_store,
        &fixture.schema,
        AttrId(1),
        PointerMode::Physical,
    );

    let results = executor.point_query(800);
    assert_eq!(results.len(), 1);
    let tuple = fixture.row_store.fetch(results[0]);
    assert_eq!(fixture.schema.read_u64(tuple, AttrId(2)), 4000);
}

/// Scenario 3: sparse outliers stay within the configured threshold and
/// are still resolved correctly by point queries.
#[test]
fn sparse_outliers_scenario() {
    let rows: Vec<(u64, u64)> = (0..2000u64)
        .map(|i| {
            let base = 3 * i;
            let host = if i % 20 == 0 { base + base / 20 } else { base };
            (i, host)
        })
        .collect();
    let fixture = build_fixture(&rows, PointerMode::Physical);

    let ci = build_correlation_index(
        &fixture.row_store,
        &fixture.schema,
        None,
        AttrId(1),
        AttrId(2),
        PointerMode::Physical,
        &interpolation_config(),
    )
    .unwrap();

    let executor = QueryExecutor::new(
        &ci,
        &fixture.host_index,
        &fixture.primary_index,
        &fixture.row_store,
        &fixture.schema,
        AttrId(1),
        PointerMode::Physical,
    );

    for guest in [0u64, 100, 999, 1999] {
        let results = executor.point_query(guest);
        assert_eq!(results.len(), 1, "guest {guest} should resolve to exactly one tuple");
    }
}

/// Scenario 4: all-equal guest collapses to a terminal root; only the
/// shared guest value resolves to anything.
#[test]
fn all_equal_guest_scenario() {
    let rows: Vec<(u64, u64)> = (0..100u64).map(|h| (42, h)).collect();
    let fixture = build_fixture(&rows, PointerMode::Physical);

    let ci = build_correlation_index(
        &fixture.row_store,
        &fixture.schema,
        None,
        AttrId(1),
        AttrId(2),
        PointerMode::Physical,
        &interpolation_config(),
    )
    .unwrap();

    let executor = QueryExecutor::new(
        &ci,
        &fixture.host_index,
        &fixture.primary_index,
        &fixture.row_store,
        &fixture.schema,
        AttrId(1),
        PointerMode::Physical,
    );

    assert_eq!(executor.point_query(42).len(), 100);
    assert!(executor.point_query(41).is_empty());
}

/// Scenario 5: queries entirely outside the training range return empty
/// at every layer.
#[test]
fn out_of_range_scenario() {
    let rows: Vec<(u64, u64)> = (100..=200u64).map(|i| (i, i)).collect();
    let fixture = build_fixture(&rows, PointerMode::Physical);

    let mut config = interpolation_config();
    config.min_node_size = 8;

    let ci = build_correlation_index(
        &fixture.row_store,
        &fixture.schema,
        None,
        AttrId(1),
        AttrId(2),
        PointerMode::Physical,
        &config,
    )
    .unwrap();

    let executor = QueryExecutor::new(
        &ci,
        &fixture.host_index,
        &fixture.primary_index,
        &fixture.row_store,
        &fixture.schema,
        AttrId(1),
        PointerMode::Physical,
    );

    assert!(executor.point_query(50).is_empty());
    assert!(executor.point_query(300).is_empty());
    assert!(executor.range_query(0, 50).is_empty());
    assert!(executor.range_query(300, 400).is_empty());
}

/// Scenario 6: a range query spanning multiple leaves returns exactly the
/// 501 tuples in [250, 750] after residual filtering.
#[test]
fn range_across_leaves_scenario() {
    let rows: Vec<(u64, u64)> = (0..1000u64).map(|i| (i, 3 * i)).collect();
    let fixture = build_fixture(&rows, PointerMode::Physical);

    let mut config = interpolation_config();
    config.fanout = 4;

    let ci = build_correlation_index(
        &fixture.row_store,
        &fixture.schema,
        None,
        AttrId(1),
        AttrId(2),
        PointerMode::Physical,
        &config,
    )
    .unwrap();

    let executor = QueryExecutor::new(
        &ci,
        &fixture.host_index,
        &fixture.primary_index,
        &fixture.row_store,
        &fixture.schema,
        AttrId(1),
        PointerMode::Physical,
    );

    let results = executor.range_query(250, 750);
    assert_eq!(results.len(), 501);

    let mut guests: Vec<u64> = results
        .iter()
        .map(|&offset| fixture.schema.read_u64(fixture.row_store.fetch(offset), AttrId(1)))
        .collect();
    guests.sort();
    assert_eq!(guests, (250..=750).collect::<Vec<_>>());
}
