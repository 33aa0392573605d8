//! Optimizer hyper-parameters.

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_ELITE_RATIO, DEFAULT_IMMIGRANT_RATIO, DEFAULT_NUM_PARAMS, DEFAULT_POPSIZE,
    DEFAULT_SIGMA_DECAY, DEFAULT_SIGMA_INIT, DEFAULT_SIGMA_LIMIT, DEFAULT_WEIGHT_DECAY,
};
use crate::error::{GaError, Result};

/// How the roulette wheel walks the reward CDF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionScan {
    /// Scan from CDF index 1 and fall back to index 0 when the scan runs off
    /// the end. The CDF position is used directly as the population row.
    #[default]
    Legacy,

    /// Scan from CDF index 0 and map the position back to the population row
    /// of the corresponding valid reward.
    Corrected,
}

/// Genetic optimizer configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Number of parameters per individual.
    pub num_params: usize,

    /// Population size.
    pub popsize: usize,

    /// Fraction of the population carried over unchanged as elites.
    pub elite_ratio: f64,

    /// Fraction of the population replaced by fresh random individuals.
    pub immigrant_ratio: f64,

    /// Initial mutation scale.
    pub sigma_init: f64,

    /// Geometric decay applied to sigma after every `tell`.
    pub sigma_decay: f64,

    /// Sigma stops annealing at this floor.
    pub sigma_limit: f64,

    /// L2 penalty coefficient subtracted from rewards (0 disables).
    pub weight_decay: f64,

    /// Roulette-wheel scan variant.
    pub selection: SelectionScan,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            num_params: DEFAULT_NUM_PARAMS,
            popsize: DEFAULT_POPSIZE,
            elite_ratio: DEFAULT_ELITE_RATIO,
            immigrant_ratio: DEFAULT_IMMIGRANT_RATIO,
            sigma_init: DEFAULT_SIGMA_INIT,
            sigma_decay: DEFAULT_SIGMA_DECAY,
            sigma_limit: DEFAULT_SIGMA_LIMIT,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            selection: SelectionScan::Legacy,
        }
    }
}

impl GaConfig {
    /// `floor(popsize * elite_ratio)`.
    pub fn elite_popsize(&self) -> usize {
        (self.popsize as f64 * self.elite_ratio).floor() as usize
    }

    /// `floor(popsize * immigrant_ratio)`.
    pub fn immigrant_popsize(&self) -> usize {
        (self.popsize as f64 * self.immigrant_ratio).floor() as usize
    }

    /// Number of crossover children per non-initial generation.
    pub fn num_children(&self) -> usize {
        self.popsize
            .saturating_sub(self.elite_popsize())
            .saturating_sub(self.immigrant_popsize())
    }

    /// Check every constraint; the optimizer refuses to start otherwise.
    ///
    /// Stricter than the bare parameter ranges in two places: the population
    /// must yield at least one elite, and `sigma_init` may not start below
    /// `sigma_limit`. A sigma that starts under its floor would never anneal
    /// and would already break the `sigma >= sigma_limit` guarantee, so such
    /// a config is refused instead of silently running with a constant sigma.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(GaError::InvalidConfiguration(msg)) };

        if self.num_params == 0 {
            return invalid("num_params must be positive".into());
        }
        if self.popsize == 0 {
            return invalid("popsize must be positive".into());
        }
        for (name, ratio) in [
            ("elite_ratio", self.elite_ratio),
            ("immigrant_ratio", self.immigrant_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return invalid(format!("{} must lie in [0, 1], got {}", name, ratio));
            }
        }
        if self.elite_ratio + self.immigrant_ratio > 1.0 {
            return invalid(format!(
                "elite_ratio + immigrant_ratio must not exceed 1, got {}",
                self.elite_ratio + self.immigrant_ratio
            ));
        }
        if self.elite_popsize() == 0 {
            return invalid(format!(
                "popsize {} with elite_ratio {} yields no elites",
                self.popsize, self.elite_ratio
            ));
        }
        if self.elite_popsize() + self.immigrant_popsize() > self.popsize {
            return invalid("elites and immigrants exceed popsize".into());
        }
        if !(self.sigma_init.is_finite() && self.sigma_init > 0.0) {
            return invalid(format!("sigma_init must be positive, got {}", self.sigma_init));
        }
        if !(self.sigma_decay > 0.0 && self.sigma_decay <= 1.0) {
            return invalid(format!(
                "sigma_decay must lie in (0, 1], got {}",
                self.sigma_decay
            ));
        }
        if !(self.sigma_limit.is_finite() && self.sigma_limit >= 0.0) {
            return invalid(format!(
                "sigma_limit must be non-negative, got {}",
                self.sigma_limit
            ));
        }
        if self.sigma_init < self.sigma_limit {
            return invalid(format!(
                "sigma_init {} is below sigma_limit {}",
                self.sigma_init, self.sigma_limit
            ));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return invalid(format!(
                "weight_decay must be non-negative, got {}",
                self.weight_decay
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> GaConfig {
        GaConfig {
            num_params: 4,
            popsize: 8,
            elite_ratio: 0.25,
            immigrant_ratio: 0.25,
            sigma_init: 1.0,
            sigma_decay: 0.9,
            sigma_limit: 0.01,
            weight_decay: 0.0,
            selection: SelectionScan::Legacy,
        }
    }

    #[test]
    fn test_derived_sizes() {
        let cfg = example();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.elite_popsize(), 2);
        assert_eq!(cfg.immigrant_popsize(), 2);
        assert_eq!(cfg.num_children(), 4);
    }

    #[test]
    fn test_sizes_truncate() {
        let cfg = GaConfig {
            popsize: 10,
            elite_ratio: 0.2,
            immigrant_ratio: 0.2,
            ..Default::default()
        };
        assert_eq!(cfg.elite_popsize(), 2);
        assert_eq!(cfg.immigrant_popsize(), 2);
        assert_eq!(cfg.num_children(), 6);
    }

    #[test]
    fn test_defaults_validate() {
        let cfg = GaConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.elite_popsize(), 25);
        assert_eq!(cfg.immigrant_popsize(), 51);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            GaConfig {
                popsize: 0,
                ..example()
            },
            GaConfig {
                num_params: 0,
                ..example()
            },
            GaConfig {
                elite_ratio: -0.1,
                ..example()
            },
            GaConfig {
                immigrant_ratio: 1.5,
                ..example()
            },
            GaConfig {
                elite_ratio: 0.6,
                immigrant_ratio: 0.6,
                ..example()
            },
            GaConfig {
                elite_ratio: 0.1,
                ..example()
            },
            GaConfig {
                sigma_init: 0.0,
                ..example()
            },
            GaConfig {
                sigma_decay: 0.0,
                ..example()
            },
            GaConfig {
                sigma_decay: 1.1,
                ..example()
            },
            GaConfig {
                sigma_limit: -1.0,
                ..example()
            },
            GaConfig {
                sigma_init: 0.001,
                ..example()
            },
            GaConfig {
                weight_decay: -0.5,
                ..example()
            },
            GaConfig {
                weight_decay: f64::NAN,
                ..example()
            },
        ];
        for cfg in cases {
            assert!(
                matches!(cfg.validate(), Err(GaError::InvalidConfiguration(_))),
                "accepted {:?}",
                cfg
            );
        }
    }

    #[test]
    fn test_sigma_init_must_reach_limit() {
        let below = GaConfig {
            sigma_init: 0.005,
            sigma_limit: 0.01,
            ..example()
        };
        match below.validate() {
            Err(GaError::InvalidConfiguration(msg)) => assert!(msg.contains("sigma_limit")),
            other => panic!("unexpected {:?}", other),
        }

        let at_floor = GaConfig {
            sigma_init: 0.01,
            sigma_limit: 0.01,
            ..example()
        };
        assert!(at_floor.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{
            "num_params": 30,
            "popsize": 10,
            "elite_ratio": 0.2,
            "selection": "corrected"
        }"#;
        let cfg: GaConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.num_params, 30);
        assert_eq!(cfg.popsize, 10);
        assert_eq!(cfg.selection, SelectionScan::Corrected);
        assert!((cfg.sigma_decay - DEFAULT_SIGMA_DECAY).abs() < 1e-12);
    }
}
