//! Elitist genetic optimizer with immigrants, driven by ask/tell.
//!
//! Each generation:
//! 1. `ask` proposes `popsize` individuals. The first generation is purely
//!    random; later ones are `[elites | immigrants | children]`.
//! 2. The caller evaluates them externally.
//! 3. `tell` applies weight decay, masks NaN/Inf rewards, rebuilds the reward
//!    CDF used for parent selection, ranks the elites, updates the best-ever
//!    record and anneals sigma.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use super::config::GaConfig;
use super::selection::{rank_elites, single_point_crossover, RewardWheel};
use super::stats::{masked_cdf, valid_indices, weight_decay_penalty};
use crate::error::{GaError, Result};
use crate::individual::{IndividualFactory, UniformFactory};

/// Snapshot of the optimizer's best results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BestSoFar {
    /// Parameters of the best individual ever observed.
    pub best_param: Array1<f64>,

    /// Historical best (weight-decayed) reward.
    pub best_reward: f64,

    /// Best reward of the most recently told generation.
    pub current_reward: Option<f64>,

    /// Current mutation scale.
    pub sigma: f64,
}

/// Genetic optimizer state.
pub struct GeneticOptimizer<F = UniformFactory, R = StdRng> {
    config: GaConfig,
    elite_popsize: usize,
    immigrant_popsize: usize,

    factory: F,
    rng: R,

    /// Current mutation scale.
    sigma: f64,

    /// Population handed out by the last `ask`.
    solutions: Array2<f64>,

    /// Population of the last successful `tell`; the parent pool.
    parents: Array2<f64>,

    /// Roulette wheel over the parents' masked rewards.
    wheel: RewardWheel,

    elite_params: Array2<f64>,
    elite_rewards: Vec<f64>,

    best_param: Array1<f64>,
    best_reward: f64,
    current_reward: Option<f64>,

    first_generation: bool,

    /// An `ask` is waiting for its `tell`.
    pending: bool,

    /// Number of completed generations.
    generation: u64,
}

impl GeneticOptimizer<UniformFactory, StdRng> {
    /// Optimizer with the uniform factory and a seeded `StdRng`.
    pub fn seeded(config: GaConfig, seed: u64) -> Result<Self> {
        Self::new(config, UniformFactory::default(), StdRng::seed_from_u64(seed))
    }
}

impl<F: IndividualFactory, R: RngCore> GeneticOptimizer<F, R> {
    /// Validate `config` and build a zero-filled optimizer.
    pub fn new(config: GaConfig, factory: F, rng: R) -> Result<Self> {
        config.validate()?;

        let n = config.num_params;
        let elite_popsize = config.elite_popsize();
        let immigrant_popsize = config.immigrant_popsize();

        Ok(Self {
            elite_popsize,
            immigrant_popsize,
            factory,
            rng,
            sigma: config.sigma_init,
            solutions: Array2::zeros((config.popsize, n)),
            parents: Array2::zeros((config.popsize, n)),
            wheel: RewardWheel::default(),
            elite_params: Array2::zeros((elite_popsize, n)),
            elite_rewards: Vec::new(),
            best_param: Array1::zeros(n),
            best_reward: 0.0,
            current_reward: None,
            first_generation: true,
            pending: false,
            generation: 0,
            config,
        })
    }

    /// Propose the next population without post-processing.
    pub fn ask(&mut self) -> Result<ArrayView2<'_, f64>> {
        self.ask_with(|population| population)
    }

    /// Propose the next population, passing it through `postprocess` first.
    ///
    /// The hook must preserve the `(popsize, num_params)` shape.
    pub fn ask_with<P>(&mut self, postprocess: P) -> Result<ArrayView2<'_, f64>>
    where
        P: FnOnce(Array2<f64>) -> Array2<f64>,
    {
        let population = if self.first_generation {
            self.factory
                .randomize(self.config.popsize, self.config.num_params, &mut self.rng)
        } else {
            self.breed()
        };

        let population = postprocess(population);
        let expected = (self.config.popsize, self.config.num_params);
        if population.dim() != expected {
            return Err(GaError::ShapeMismatch {
                expected,
                actual: population.dim(),
            });
        }

        self.solutions = population;
        self.pending = true;
        Ok(self.solutions.view())
    }

    /// Assemble `[elites | immigrants | children]` from the parent pool.
    fn breed(&mut self) -> Array2<f64> {
        let n = self.config.num_params;
        let scan = self.config.selection;
        let num_children = self.config.num_children();
        let immigrants_end = self.elite_popsize + self.immigrant_popsize;

        let selected: Vec<usize> = (0..2 * num_children)
            .map(|_| self.wheel.spin(scan, &mut self.rng))
            .collect();

        let mut population = Array2::<f64>::zeros((self.config.popsize, n));
        population
            .slice_mut(s![..self.elite_popsize, ..])
            .assign(&self.elite_params);

        let immigrants = self
            .factory
            .randomize(self.immigrant_popsize, n, &mut self.rng);
        population
            .slice_mut(s![self.elite_popsize..immigrants_end, ..])
            .assign(&immigrants);

        for (k, pair) in selected.chunks_exact(2).enumerate() {
            let a = self.parents.row(pair[0]);
            let b = self.parents.row(pair[1]);
            let child = if self.rng.gen::<f64>() > 0.5 {
                single_point_crossover(a, b, &mut self.rng)
            } else {
                single_point_crossover(b, a, &mut self.rng)
            };
            let child = self.factory.mutate(child, &mut self.rng);
            population.row_mut(immigrants_end + k).assign(&child);
        }

        population
    }

    /// Report one reward per individual of the last `ask`, positionally.
    ///
    /// On error the optimizer is left untouched and the outstanding
    /// population can be told again.
    pub fn tell(&mut self, rewards: &[f64]) -> Result<()> {
        if !self.pending {
            return Err(GaError::OutOfSequence("tell called without a preceding ask"));
        }
        if rewards.len() != self.config.popsize {
            return Err(GaError::InvalidInput {
                expected: self.config.popsize,
                actual: rewards.len(),
            });
        }

        let mut rewards = rewards.to_vec();
        if self.config.weight_decay > 0.0 {
            let penalty = weight_decay_penalty(self.config.weight_decay, self.solutions.view());
            for (r, p) in rewards.iter_mut().zip(penalty.iter()) {
                *r += p;
            }
        }

        let rows = valid_indices(&rewards);
        let insufficient = GaError::InsufficientValidRewards {
            valid: rows.len(),
            required: self.elite_popsize,
        };
        if rows.len() < self.elite_popsize {
            return Err(insufficient);
        }
        let cdf = masked_cdf(&rewards).ok_or(insufficient)?;

        let masked = rewards.len() - rows.len();
        if masked > 0 {
            tracing::warn!(
                generation = self.generation,
                masked,
                "masked non-finite rewards"
            );
        }

        let elite_idx = rank_elites(&rewards, self.elite_popsize);
        self.elite_params = self.solutions.select(Axis(0), &elite_idx);
        self.elite_rewards = elite_idx.iter().map(|&i| rewards[i]).collect();

        let current = self.elite_rewards[0];
        self.current_reward = Some(current);
        if self.first_generation || current > self.best_reward {
            self.best_reward = current;
            self.best_param = self.elite_params.row(0).to_owned();
        }

        if self.sigma > self.config.sigma_limit {
            self.sigma = (self.sigma * self.config.sigma_decay).max(self.config.sigma_limit);
        }

        self.wheel = RewardWheel::new(cdf, rows);
        self.parents = self.solutions.clone();
        self.first_generation = false;
        self.pending = false;
        self.generation += 1;

        tracing::debug!(
            generation = self.generation,
            best = self.best_reward,
            current,
            sigma = self.sigma,
            "generation told"
        );
        Ok(())
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    pub fn elite_popsize(&self) -> usize {
        self.elite_popsize
    }

    pub fn immigrant_popsize(&self) -> usize {
        self.immigrant_popsize
    }

    /// Current mutation scale.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Same sigma for every parameter.
    pub fn rms_stdev(&self) -> f64 {
        self.sigma
    }

    /// Completed generations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_first_generation(&self) -> bool {
        self.first_generation
    }

    /// Population from the last `ask`.
    pub fn solutions(&self) -> ArrayView2<'_, f64> {
        self.solutions.view()
    }

    /// Elites of the last `tell`, best first.
    pub fn elite_params(&self) -> ArrayView2<'_, f64> {
        self.elite_params.view()
    }

    /// Weight-decayed rewards of the elites, descending.
    pub fn elite_rewards(&self) -> &[f64] {
        &self.elite_rewards
    }

    /// Masked reward CDF of the last told generation.
    pub fn reward_cdf(&self) -> &[f64] {
        &self.wheel.cdf
    }

    /// Best elite of the latest generation.
    pub fn current_param(&self) -> Option<ArrayView1<'_, f64>> {
        if self.first_generation {
            return None;
        }
        Some(self.elite_params.row(0))
    }

    pub fn best_param(&self) -> ArrayView1<'_, f64> {
        self.best_param.view()
    }

    pub fn best_reward(&self) -> f64 {
        self.best_reward
    }

    /// Best reward of the most recently told generation.
    pub fn current_reward(&self) -> Option<f64> {
        self.current_reward
    }

    /// Best parameters, historical best reward, latest generation best and sigma.
    pub fn current_best(&self) -> BestSoFar {
        BestSoFar {
            best_param: self.best_param.clone(),
            best_reward: self.best_reward,
            current_reward: self.current_reward,
            sigma: self.sigma,
        }
    }
}
