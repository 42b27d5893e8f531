//! Synthetic guest/host data for the `micro` benchmark source: a guest
//! column and a correlated host column with a linear or sigmoid-shaped
//! relationship, then a fraction of rows perturbed to produce outliers.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    Linear,
    Sigmoid,
}

/// Generates `tuple_count` (guest, host) pairs with guest `0..tuple_count`
/// and host shaped by `distribution`, scaled into a comparable range.
/// `outlier_ratio` (in `[0, 1]`) is the fraction of rows whose host value
/// is perturbed away from the fitted curve.
pub fn generate(
    tuple_count: usize,
    distribution: Distribution,
    outlier_ratio: f64,
    rng: &mut impl Rng,
) -> Vec<(u64, u64)> {
    let scale = 1000.0;
    let mut rows = Vec::with_capacity(tuple_count);

    for guest in 0..tuple_count as u64 {
        let host_f = match distribution {
            Distribution::Linear => 3.0 * guest as f64,
            Distribution::Sigmoid => {
                let x = (guest as f64 / tuple_count.max(1) as f64) * 12.0 - 6.0;
                scale / (1.0 + (-x).exp())
            }
        };

        let host_f = if rng.gen::<f64>() < outlier_ratio {
            host_f + rng.gen_range(-scale..scale)
        } else {
            host_f
        };

        rows.push((guest, host_f.max(0.0).round() as u64));
    }

    rows
}
