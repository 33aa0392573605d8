//! Evolutionary optimizer: configuration, numeric helpers, selection and the
//! ask/tell state machine.

pub mod config;
pub mod ga;
pub mod selection;
pub mod stats;

pub use config::{GaConfig, SelectionScan};
pub use ga::{BestSoFar, GeneticOptimizer};
