//! Model fitting for a single node's span.

use super::config::ModelKind;
use super::triple::Triple;
use crate::number::round_to_u64;

/// A fitted linear model: `predicted(g) = round(slope * g + intercept)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedModel {
    pub slope: f64,
    pub intercept: f64,
    pub epsilon: u64,
}

impl FittedModel {
    pub fn predict(&self, guest: u64) -> u64 {
        round_to_u64(self.slope * guest as f64 + self.intercept)
    }
}

/// Fits `span` under `kind`. Returns `None` when the model kind's
/// precondition fails (constant guest for interpolation, zero variance for
/// regression) — callers fall back to a terminal outlier node in that case.
pub fn fit(span: &[Triple], kind: ModelKind, error_bound: u64) -> Option<FittedModel> {
    let (slope, intercept) = match kind {
        ModelKind::Interpolation => fit_interpolation(span)?,
        ModelKind::Regression => fit_regression(span)?,
    };

    let guest_lo = span.first()?.guest;
    let guest_hi = span.last()?.guest;
    let host_lo = span.first()?.host;
    let host_hi = span.last()?.host;
    let epsilon = compute_epsilon(error_bound, span.len(), guest_lo, guest_hi, host_lo, host_hi);

    Some(FittedModel { slope, intercept, epsilon })
}

fn fit_interpolation(span: &[Triple]) -> Option<(f64, f64)> {
    let first = span.first()?;
    let last = span.last()?;
    if last.guest <= first.guest {
        return None;
    }
    let slope = (last.host as f64 - first.host as f64) / (last.guest as f64 - first.guest as f64);
    let intercept = first.host as f64 - slope * first.guest as f64;
    Some((slope, intercept))
}

fn fit_regression(span: &[Triple]) -> Option<(f64, f64)> {
    let n = span.len() as f64;
    if n == 0.0 {
        return None;
    }
    let mean_guest: f64 = span.iter().map(|t| t.guest as f64).sum::<f64>() / n;
    let mean_host: f64 = span.iter().map(|t| t.host as f64).sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for t in span {
        let dg = t.guest as f64 - mean_guest;
        let dh = t.host as f64 - mean_host;
        numerator += dg * dh;
        denominator += dg * dg;
    }

    if denominator == 0.0 {
        return None;
    }

    let slope = numerator / denominator;
    let intercept = mean_host - slope * mean_guest;
    Some((slope, intercept))
}

/// `epsilon`: a host-value tolerance shaped by local density,
/// `ceil(error_bound / (span_length / (host_hi - host_lo)) / 2)`
/// when `host_hi > host_lo`, else `error_bound` itself (constant-host span).
fn compute_epsilon(
    error_bound: u64,
    span_length: usize,
    _guest_lo: u64,
    _guest_hi: u64,
    host_lo: u64,
    host_hi: u64,
) -> u64 {
    if host_hi > host_lo {
        let density = span_length as f64 / (host_hi - host_lo) as f64;
        (error_bound as f64 / density / 2.0).ceil() as u64
    } else {
        error_bound
    }
}
