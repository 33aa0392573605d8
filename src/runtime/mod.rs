//! Runtime: everything around the optimizer that a complete run needs.
//!
//! This module provides:
//! - The evaluator seam (`Evaluator`) and a closure adapter
//! - Benchmark objectives over the unit box
//! - Progress monitoring and stagnation detection
//! - The generation driver used by the CLI binary

pub mod driver;
pub mod evaluator;
pub mod monitor;
pub mod objectives;

pub use driver::{DriverConfig, EvolutionDriver, GenerationRecord, RunSummary};
pub use evaluator::{Evaluator, FnEvaluator};
pub use monitor::{ProgressMonitor, ProgressReport, ProgressStatus};
pub use objectives::{Objective, ObjectiveEvaluator};
