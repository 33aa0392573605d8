//! Parent selection, crossover and elite ranking.

use std::cmp::Ordering;

use ndarray::{s, Array1, ArrayView1};
use rand::{Rng, RngCore};

use super::config::SelectionScan;

/// Roulette wheel over the masked reward CDF of the last told generation.
#[derive(Clone, Debug, Default)]
pub struct RewardWheel {
    /// Collapsed cumulative distribution, one entry per valid reward.
    pub cdf: Vec<f64>,

    /// Population row of each CDF entry.
    pub rows: Vec<usize>,
}

impl RewardWheel {
    pub fn new(cdf: Vec<f64>, rows: Vec<usize>) -> Self {
        debug_assert_eq!(cdf.len(), rows.len());
        Self { cdf, rows }
    }

    /// Resolve a uniform draw `u` to a population row.
    pub fn select(&self, u: f64, scan: SelectionScan) -> usize {
        match scan {
            SelectionScan::Legacy => self
                .cdf
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, c)| **c >= u)
                .map_or(0, |(i, _)| i),
            SelectionScan::Corrected => {
                let pos = self
                    .cdf
                    .iter()
                    .position(|&c| c >= u)
                    .unwrap_or(self.cdf.len().saturating_sub(1));
                self.rows.get(pos).copied().unwrap_or(0)
            }
        }
    }

    /// Draw `u ~ U[0, 1)` and select a row.
    pub fn spin(&self, scan: SelectionScan, rng: &mut dyn RngCore) -> usize {
        let u = rng.gen::<f64>();
        self.select(u, scan)
    }
}

/// Single-point crossover: `first[..cut]` followed by `second[cut..]`, with
/// `cut` uniform in `[0, len - 1)`.
pub fn single_point_crossover(
    first: ArrayView1<f64>,
    second: ArrayView1<f64>,
    rng: &mut dyn RngCore,
) -> Array1<f64> {
    let span = first.len().saturating_sub(1);
    let cut = ((span as f64) * rng.gen::<f64>()) as usize;
    splice_at(first, second, cut)
}

/// `first[..cut]` followed by `second[cut..]`.
pub fn splice_at(first: ArrayView1<f64>, second: ArrayView1<f64>, cut: usize) -> Array1<f64> {
    let mut child = second.to_owned();
    child.slice_mut(s![..cut]).assign(&first.slice(s![..cut]));
    child
}

/// Valid population rows ordered best-first, truncated to `count`.
///
/// Ranking is a stable ascending sort reversed, so equal rewards favour the
/// later row.
pub fn rank_elites(rewards: &[f64], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rewards.len())
        .filter(|&i| rewards[i].is_finite())
        .collect();
    order.sort_by(|&a, &b| rewards[a].partial_cmp(&rewards[b]).unwrap_or(Ordering::Equal));
    order.reverse();
    order.truncate(count);
    order
}
