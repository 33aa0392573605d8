//! Shared numeric helpers: L2 weight decay and masked reward statistics.
//!
//! A reward is *valid* when it is finite. Invalid rewards never contribute
//! to normalisation, ranking or selection.

use ndarray::{Array1, ArrayView2, Axis};

/// Per-individual L2 penalty: `-coeff * mean(x_i^2)` over each row.
pub fn weight_decay_penalty(coeff: f64, population: ArrayView2<f64>) -> Array1<f64> {
    let dims = population.ncols().max(1) as f64;
    population.mapv(|x| x * x).sum_axis(Axis(1)) * (-coeff / dims)
}

/// Indices of finite rewards, in population order.
pub fn valid_indices(rewards: &[f64]) -> Vec<usize> {
    rewards
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_finite())
        .map(|(i, _)| i)
        .collect()
}

/// Cumulative normalised distribution over the valid rewards.
///
/// The result is collapsed: one entry per valid reward. `None` when there
/// are no valid rewards or their sum is zero or not finite.
pub fn masked_cdf(rewards: &[f64]) -> Option<Vec<f64>> {
    let valid: Vec<f64> = rewards.iter().copied().filter(|r| r.is_finite()).collect();
    let total: f64 = valid.iter().sum();
    if valid.is_empty() || total == 0.0 || !total.is_finite() {
        return None;
    }

    let mut acc = 0.0;
    Some(
        valid
            .iter()
            .map(|r| {
                acc += r;
                acc / total
            })
            .collect(),
    )
}

/// Mean of the valid rewards, `None` if there are none.
pub fn masked_mean(rewards: &[f64]) -> Option<f64> {
    let (sum, n) = rewards
        .iter()
        .filter(|r| r.is_finite())
        .fold((0.0, 0usize), |(s, n), r| (s + r, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sample standard deviation of the valid rewards (0 with fewer than two).
pub fn masked_std(rewards: &[f64]) -> f64 {
    let valid: Vec<f64> = rewards.iter().copied().filter(|r| r.is_finite()).collect();
    if valid.len() < 2 {
        return 0.0;
    }
    let mean = valid.iter().sum::<f64>() / valid.len() as f64;
    let var = valid.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (valid.len() - 1) as f64;
    var.sqrt()
}

/// Largest valid reward.
pub fn masked_max(rewards: &[f64]) -> Option<f64> {
    rewards
        .iter()
        .copied()
        .filter(|r| r.is_finite())
        .fold(None, |best, r| Some(best.map_or(r, |b: f64| b.max(r))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_weight_decay_penalty() {
        let pop = array![[0.0, 0.0], [1.0, 1.0], [0.5, -0.5]];
        let penalty = weight_decay_penalty(0.1, pop.view());
        assert!((penalty[0] - 0.0).abs() < 1e-12);
        assert!((penalty[1] + 0.1).abs() < 1e-12);
        assert!((penalty[2] + 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_masked_cdf_skips_invalid() {
        let cdf = masked_cdf(&[1.0, f64::NAN, 2.0, f64::INFINITY, 1.0]).unwrap();
        assert_eq!(cdf.len(), 3);
        assert!((cdf[0] - 0.25).abs() < 1e-12);
        assert!((cdf[1] - 0.75).abs() < 1e-12);
        assert!((cdf[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_masked_cdf_degenerate() {
        assert!(masked_cdf(&[f64::NAN, f64::NEG_INFINITY]).is_none());
        assert!(masked_cdf(&[]).is_none());
        assert!(masked_cdf(&[1.0, -1.0]).is_none());
    }

    #[test]
    fn test_valid_indices() {
        assert_eq!(valid_indices(&[f64::NAN, 3.0, f64::INFINITY, -2.0]), vec![1, 3]);
    }

    #[test]
    fn test_masked_moments() {
        let r = [1.0, f64::NAN, 3.0];
        assert_eq!(masked_mean(&r), Some(2.0));
        assert!((masked_std(&r) - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(masked_max(&r), Some(3.0));
        assert_eq!(masked_mean(&[f64::NAN]), None);
        assert_eq!(masked_max(&[]), None);
    }
}
