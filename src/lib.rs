//! # popsearch
//!
//! A black-box, population-based continuous optimizer driven through an
//! **ask/tell** protocol. Each generation the optimizer proposes a batch of
//! parameter vectors (`ask`) and receives one scalar reward per candidate
//! from an opaque evaluator (`tell`). No gradients are used; rewards may be
//! noisy, NaN or infinite.
//!
//! ## Components
//!
//! 1. **Individual factory**: uniform random individuals and per-coordinate
//!    Gaussian mutation, injected into the optimizer as a capability.
//! 2. **Genetic optimizer**: elitism, roulette-wheel parent selection over a
//!    masked reward CDF, single-point crossover, immigrant injection, L2
//!    weight decay on rewards and sigma annealing.
//! 3. **Runtime**: evaluator seam, benchmark objectives, a generation driver
//!    and a progress monitor used by the CLI.
//!
//! ## Generation layout
//!
//! Every non-initial population is `[elites | immigrants | children]`, in that
//! order, with sizes `floor(popsize * elite_ratio)`,
//! `floor(popsize * immigrant_ratio)` and the remainder.

pub mod error;
pub mod individual;
pub mod optimizer;
pub mod runtime;

pub use error::{GaError, Result};
pub use individual::{boundary, IndividualFactory, UniformFactory};
pub use optimizer::{BestSoFar, GaConfig, GeneticOptimizer, SelectionScan};

/// Fixed constants and default hyper-parameters.
pub mod config {
    /// Probability that a coordinate is left untouched by mutation.
    pub const MUTATION_RATE: f64 = 0.5;

    /// Modulus applied to a mutated coordinate.
    pub const MUTATION_MODULUS: f64 = 0.99;

    /// Upper bound (exclusive) used by the boundary wraparound.
    pub const BOUNDARY_MODULUS: f64 = 1.0 + f64::EPSILON;

    /// Default number of parameters per individual.
    pub const DEFAULT_NUM_PARAMS: usize = 10;

    /// Default population size.
    pub const DEFAULT_POPSIZE: usize = 256;

    /// Default fraction of the population kept as elites.
    pub const DEFAULT_ELITE_RATIO: f64 = 0.1;

    /// Default fraction of the population replaced by immigrants.
    pub const DEFAULT_IMMIGRANT_RATIO: f64 = 0.2;

    /// Default initial mutation scale.
    pub const DEFAULT_SIGMA_INIT: f64 = 0.1;

    /// Default geometric sigma decay per generation.
    pub const DEFAULT_SIGMA_DECAY: f64 = 0.999;

    /// Default sigma floor.
    pub const DEFAULT_SIGMA_LIMIT: f64 = 0.01;

    /// Default L2 weight-decay coefficient.
    pub const DEFAULT_WEIGHT_DECAY: f64 = 0.01;
}
