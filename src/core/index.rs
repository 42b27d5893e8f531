//! The Correlation Index proper: a recursively partitioned, piecewise-linear
//! model over training triples, built once and queried read-only.
//!
//! `construct` consumes its input and returns an immutable handle, the
//! same shape as a consuming builder chain (`new` -> `build` -> `partition`,
//! each taking `self` by value): there's no path back to a mutable
//! construction-time state once the index exists.

use std::collections::VecDeque;
use std::io::{self, Write};

use log::{debug, info};
use thiserror::Error;

use super::config::{CIConfig, ConfigError};
use super::model::{self, FittedModel};
use super::node::{HostRange, Node};
use super::triple::{sort_triples, Triple};
use crate::store::PointerMode;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Immutable once constructed: there are no `&mut self` methods after
/// [`CorrelationIndex::construct`].
#[derive(Debug, Clone)]
pub struct CorrelationIndex {
    nodes: Vec<Node>,
    root: usize,
    pointer_mode: PointerMode,
}

struct Pending {
    node_idx: usize,
    begin: usize,
    end: usize,
    level: usize,
}

impl CorrelationIndex {
    /// Builds a CI over `triples`, consuming them. `triples` need not be
    /// pre-sorted: construction re-sorts by `(guest, original-index)` so
    /// the result is deterministic regardless of what order the caller
    /// passed them in.
    pub fn construct(
        mut triples: Vec<Triple>,
        config: &CIConfig,
        pointer_mode: PointerMode,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        sort_triples(&mut triples);

        let mut nodes = Vec::new();

        if triples.is_empty() {
            nodes.push(Node {
                level: 0,
                guest_lo: 0,
                guest_hi: 0,
                host_lo: 0,
                host_hi: 0,
                model: None,
                outliers: super::outliers::OutlierSet::new(),
                children: Vec::new(),
                children_sep: Vec::new(),
                span_length: 0,
            });
            return Ok(CorrelationIndex { nodes, root: 0, pointer_mode });
        }

        nodes.push(placeholder());
        let mut queue = VecDeque::new();
        queue.push_back(Pending { node_idx: 0, begin: 0, end: triples.len() - 1, level: 0 });

        while let Some(pending) = queue.pop_front() {
            build_node(pending, &triples, config, &mut nodes, &mut queue);
        }

        info!(
            "correlation index built: {} nodes over {} triples",
            nodes.len(),
            triples.len()
        );

        Ok(CorrelationIndex { nodes, root: 0, pointer_mode })
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn lookup_point(&self, guest: u64) -> (Option<HostRange>, Vec<u64>) {
        let root = &self.nodes[self.root];
        if guest < root.guest_lo || guest > root.guest_hi {
            return (None, Vec::new());
        }

        let mut node = root;
        while !node.is_leaf() {
            let child_idx = node.child_for_guest(guest);
            node = &self.nodes[child_idx];
        }

        let outlier_refs = node.outliers.equal_range(guest);
        let range = node.predicted_range(guest);
        (range, outlier_refs)
    }

    pub fn lookup_range(&self, guest_lo: u64, guest_hi: u64) -> (Vec<HostRange>, Vec<u64>) {
        let mut ranges = Vec::new();
        let mut outliers = Vec::new();

        if guest_lo > guest_hi {
            return (ranges, outliers);
        }

        let root = &self.nodes[self.root];
        if guest_hi < root.guest_lo || guest_lo > root.guest_hi {
            return (ranges, outliers);
        }

        self.collect_range(self.root, guest_lo, guest_hi, &mut ranges, &mut outliers);
        (ranges, outliers)
    }

    fn collect_range(
        &self,
        node_idx: usize,
        lo: u64,
        hi: u64,
        ranges: &mut Vec<HostRange>,
        outliers: &mut Vec<u64>,
    ) {
        let node = &self.nodes[node_idx];
        let clipped_lo = lo.max(node.guest_lo);
        let clipped_hi = hi.min(node.guest_hi);
        if clipped_lo > clipped_hi {
            return;
        }

        if node.is_leaf() {
            outliers.extend(node.outliers.range_scan(clipped_lo, clipped_hi));
            if let Some(model) = node.model {
                let h_lo = model.predict(clipped_lo);
                let h_hi = model.predict(clipped_hi);
                let (min_h, max_h) = if h_lo <= h_hi { (h_lo, h_hi) } else { (h_hi, h_lo) };
                ranges.push(HostRange {
                    lo: min_h.saturating_sub(model.epsilon),
                    hi: max_h.saturating_add(model.epsilon),
                });
            }
            return;
        }

        for child in node.children_intersecting(clipped_lo, clipped_hi) {
            self.collect_range(child, clipped_lo, clipped_hi, ranges, outliers);
        }
    }

    /// BFS-order CSV diagnostic dump. `self.nodes` is already in BFS
    /// order: nodes are allocated in the order the build's BFS queue
    /// discovers them.
    pub fn print(&self, verbose: bool, out: &mut impl Write) -> io::Result<()> {
        if !verbose {
            return Ok(());
        }
        writeln!(
            out,
            "level,guest_lo,guest_hi,host_lo,host_hi,span_length,epsilon,slope,intercept,outlier_count,is_leaf,model_valid"
        )?;
        for node in &self.nodes {
            let (host_lo, host_hi, slope, intercept, epsilon) = match node.model {
                Some(FittedModel { slope, intercept, epsilon }) => (
                    node.host_lo.to_string(),
                    node.host_hi.to_string(),
                    slope.to_string(),
                    intercept.to_string(),
                    epsilon.to_string(),
                ),
                None => ("NA".into(), "NA".into(), "NA".into(), "NA".into(), "NA".into()),
            };
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{},{},{}",
                node.level,
                node.guest_lo,
                node.guest_hi,
                host_lo,
                host_hi,
                node.span_length,
                epsilon,
                slope,
                intercept,
                node.outliers.len(),
                node.is_leaf(),
                node.model_valid(),
            )?;
        }
        Ok(())
    }
}

fn placeholder() -> Node {
    Node {
        level: 0,
        guest_lo: 0,
        guest_hi: 0,
        host_lo: 0,
        host_hi: 0,
        model: None,
        outliers: super::outliers::OutlierSet::new(),
        children: Vec::new(),
        children_sep: Vec::new(),
        span_length: 0,
    }
}

fn terminal_outliers(span: &[Triple]) -> super::outliers::OutlierSet {
    let mut outliers = super::outliers::OutlierSet::new();
    for t in span {
        outliers.push(t.guest, t.tuple_ref);
    }
    outliers.finish();
    outliers
}

fn build_node(
    pending: Pending,
    triples: &[Triple],
    config: &CIConfig,
    nodes: &mut Vec<Node>,
    queue: &mut VecDeque<Pending>,
) {
    let span = &triples[pending.begin..=pending.end];
    let span_length = span.len();
    let guest_lo = span.first().unwrap().guest;
    let guest_hi = span.last().unwrap().guest;
    let host_lo = span.first().unwrap().host;
    let host_hi = span.last().unwrap().host;

    let forced_terminal = span_length <= config.min_node_size
        || pending.level + 1 == config.max_height
        || span_length < config.fanout;

    let fitted = if forced_terminal {
        None
    } else {
        model::fit(span, config.model_kind, config.error_bound)
    };

    let node = match fitted {
        None => {
            debug!(
                "level {}: span {}..={} terminal ({} points, forced={})",
                pending.level, pending.begin, pending.end, span_length, forced_terminal
            );
            Node {
                level: pending.level,
                guest_lo,
                guest_hi,
                host_lo,
                host_hi,
                model: None,
                outliers: terminal_outliers(span),
                children: Vec::new(),
                children_sep: Vec::new(),
                span_length,
            }
        }
        Some(fitted_model) => {
            let mut outliers = super::outliers::OutlierSet::new();
            for t in span {
                let predicted = fitted_model.predict(t.guest);
                let lo = predicted.saturating_sub(fitted_model.epsilon);
                let hi = predicted.saturating_add(fitted_model.epsilon);
                if t.host < lo || t.host > hi {
                    outliers.push(t.guest, t.tuple_ref);
                }
            }

            let validation_fails =
                outliers.len() as f64 > span_length as f64 * config.outlier_threshold;

            if validation_fails {
                debug!(
                    "level {}: span {}..={} failed validation ({} outliers / {} points), splitting",
                    pending.level, pending.begin, pending.end, outliers.len(), span_length
                );
                match split_span(triples, pending.begin, pending.end, config.fanout) {
                    Some(slices) => {
                        let mut children = Vec::with_capacity(config.fanout);
                        let mut children_sep = Vec::with_capacity(config.fanout.saturating_sub(1));
                        for (i, (cb, ce)) in slices.iter().enumerate() {
                            if i > 0 {
                                children_sep.push(triples[*cb].guest);
                            }
                            let child_idx = nodes.len();
                            nodes.push(placeholder());
                            children.push(child_idx);
                            queue.push_back(Pending {
                                node_idx: child_idx,
                                begin: *cb,
                                end: *ce,
                                level: pending.level + 1,
                            });
                        }
                        Node {
                            level: pending.level,
                            guest_lo,
                            guest_hi,
                            host_lo,
                            host_hi,
                            model: None,
                            outliers: super::outliers::OutlierSet::new(),
                            children,
                            children_sep,
                            span_length,
                        }
                    }
                    None => {
                        debug!(
                            "level {}: span {}..={} cannot split without tearing a run of equal guests apart, forcing terminal",
                            pending.level, pending.begin, pending.end
                        );
                        Node {
                            level: pending.level,
                            guest_lo,
                            guest_hi,
                            host_lo,
                            host_hi,
                            model: None,
                            outliers: terminal_outliers(span),
                            children: Vec::new(),
                            children_sep: Vec::new(),
                            span_length,
                        }
                    }
                }
            } else {
                outliers.finish();
                Node {
                    level: pending.level,
                    guest_lo,
                    guest_hi,
                    host_lo,
                    host_hi,
                    model: Some(fitted_model),
                    outliers,
                    children: Vec::new(),
                    children_sep: Vec::new(),
                    span_length,
                }
            }
        }
    };

    nodes[pending.node_idx] = node;
}

/// Divides `[begin, end]` into `fanout` roughly-equal slices by index, the
/// last absorbing the remainder, then snaps every internal boundary
/// forward to the next guest-value change so a run of equal-guest
/// training points never straddles two children (`children_sep` must
/// equal a training point's guest value with every point of that guest
/// routed to the same child — see `Node::child_for_guest`). Returns `None`
/// if a run of ties is long enough that snapping would leave some child
/// empty; callers should fall back to a terminal node in that case.
fn split_span(triples: &[Triple], begin: usize, end: usize, fanout: usize) -> Option<Vec<(usize, usize)>> {
    let len = end - begin + 1;
    debug_assert!(len >= fanout, "span shorter than fanout cannot split without empty children");
    let base = len / fanout;

    let mut bounds = Vec::with_capacity(fanout + 1);
    bounds.push(begin);
    let mut prev = begin;
    for i in 1..fanout {
        let mut candidate = (begin + base * i).max(prev);
        while candidate <= end && triples[candidate].guest == triples[candidate - 1].guest {
            candidate += 1;
        }
        bounds.push(candidate);
        prev = candidate;
    }
    bounds.push(end + 1);

    for w in bounds.windows(2) {
        if w[0] >= w[1] {
            return None;
        }
    }

    Some((0..fanout).map(|i| (bounds[i], bounds[i + 1] - 1)).collect())
}
