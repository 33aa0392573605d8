//! Benchmark objectives over the unit box.
//!
//! Rewards are kept positive so the roulette wheel gets a well-formed CDF:
//! every objective maps a non-negative loss `L` to `1 / (1 + L)`.

use std::f64::consts::PI;

use anyhow::Result;
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::evaluator::Evaluator;

/// Benchmark landscape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Squared distance to `target` in every coordinate.
    Sphere { target: f64 },

    /// Rastrigin, centred on `target` and scaled to the unit box.
    Rastrigin { target: f64 },

    /// Sphere with additive Gaussian noise; a fraction of evaluations fail
    /// and report NaN.
    NoisySphere {
        target: f64,
        noise: f64,
        nan_rate: f64,
    },
}

impl Objective {
    /// Noise-free loss of one individual.
    pub fn loss(&self, x: ArrayView1<f64>) -> f64 {
        match *self {
            Objective::Sphere { target } | Objective::NoisySphere { target, .. } => {
                x.iter().map(|&v| (v - target).powi(2)).sum()
            }
            Objective::Rastrigin { target } => {
                // Map [0, 1) onto [-2.56, 2.56) around the target.
                x.iter()
                    .map(|&v| {
                        let z = (v - target) * 5.12;
                        z * z - 10.0 * (2.0 * PI * z).cos() + 10.0
                    })
                    .sum()
            }
        }
    }

    /// Noise-free reward in `(0, 1]`.
    pub fn reward(&self, x: ArrayView1<f64>) -> f64 {
        1.0 / (1.0 + self.loss(x))
    }
}

/// Evaluates an [`Objective`] with its own seeded noise source.
pub struct ObjectiveEvaluator {
    pub objective: Objective,
    noise: Option<Normal<f64>>,
    rng: StdRng,

    /// Individuals scored so far.
    pub evaluations: u64,
}

impl ObjectiveEvaluator {
    pub fn new(objective: Objective, seed: u64) -> Result<Self> {
        let noise = match objective {
            Objective::NoisySphere { noise, .. } if noise > 0.0 => Some(Normal::new(0.0, noise)?),
            _ => None,
        };
        Ok(Self {
            objective,
            noise,
            rng: StdRng::seed_from_u64(seed),
            evaluations: 0,
        })
    }
}

impl Evaluator for ObjectiveEvaluator {
    fn evaluate(&mut self, population: ArrayView2<f64>) -> Result<Vec<f64>> {
        let nan_rate = match self.objective {
            Objective::NoisySphere { nan_rate, .. } => nan_rate,
            _ => 0.0,
        };

        let rewards = population
            .rows()
            .into_iter()
            .map(|row| {
                if nan_rate > 0.0 && self.rng.gen::<f64>() < nan_rate {
                    return f64::NAN;
                }
                let reward = self.objective.reward(row);
                match self.noise {
                    Some(ref dist) => reward + dist.sample(&mut self.rng),
                    None => reward,
                }
            })
            .collect();

        self.evaluations += population.nrows() as u64;
        Ok(rewards)
    }
}
