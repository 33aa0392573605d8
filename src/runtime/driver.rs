//! Generation driver: ask → evaluate → tell, with history and early stop.
//!
//! A driver can run several phases on the same optimizer, each with its own
//! evaluator (for example an expensive true evaluator followed by a cheap
//! surrogate). Optimizer state carries over between phases.

use anyhow::{Context, Result};
use rand::RngCore;
use serde::Serialize;

use super::evaluator::Evaluator;
use super::monitor::{ProgressMonitor, ProgressReport, ProgressStatus};
use crate::individual::{boundary, IndividualFactory};
use crate::optimizer::stats::{masked_max, masked_mean, masked_std};
use crate::optimizer::{BestSoFar, GeneticOptimizer};

/// Driver configuration.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Generations per call to [`EvolutionDriver::run`].
    pub generations: usize,

    /// Stop a phase early after this many generations without improvement.
    pub patience: Option<usize>,

    /// Rolling window used by the progress monitor.
    pub window: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            generations: 100,
            patience: None,
            window: 20,
        }
    }
}

/// Per-generation statistics.
#[derive(Clone, Debug, Serialize)]
pub struct GenerationRecord {
    pub generation: u64,
    pub best_reward: f64,
    pub current_reward: f64,
    /// Mean of the raw valid rewards.
    pub mean_reward: Option<f64>,
    /// Largest raw valid reward.
    pub max_reward: Option<f64>,
    pub reward_std: f64,
    /// Masked (NaN/Inf) rewards.
    pub invalid: usize,
    pub sigma: f64,
}

/// Outcome of one phase.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub generations_run: usize,
    pub stopped_early: bool,
    pub best: BestSoFar,
    pub progress: ProgressReport,
}

pub struct EvolutionDriver<F, R> {
    optimizer: GeneticOptimizer<F, R>,
    config: DriverConfig,
    monitor: ProgressMonitor,
    history: Vec<GenerationRecord>,
}

impl<F: IndividualFactory, R: RngCore> EvolutionDriver<F, R> {
    pub fn new(optimizer: GeneticOptimizer<F, R>, config: DriverConfig) -> Self {
        let monitor = ProgressMonitor::new(config.window, config.patience);
        Self {
            optimizer,
            config,
            monitor,
            history: Vec::new(),
        }
    }

    /// Run one generation.
    pub fn step<E: Evaluator + ?Sized>(&mut self, evaluator: &mut E) -> Result<GenerationRecord> {
        let population = self.optimizer.ask_with(boundary)?;
        let rewards = evaluator.evaluate(population).with_context(|| {
            format!(
                "evaluator failed at generation {}",
                self.optimizer.generation()
            )
        })?;

        self.optimizer.tell(&rewards).with_context(|| {
            format!(
                "tell rejected rewards at generation {}",
                self.optimizer.generation()
            )
        })?;

        let best = self.optimizer.current_best();
        let record = GenerationRecord {
            generation: self.optimizer.generation(),
            best_reward: best.best_reward,
            current_reward: best.current_reward.unwrap_or(f64::NAN),
            mean_reward: masked_mean(&rewards),
            max_reward: masked_max(&rewards),
            reward_std: masked_std(&rewards),
            invalid: rewards.iter().filter(|r| !r.is_finite()).count(),
            sigma: best.sigma,
        };

        self.monitor.record(&record, self.optimizer.config().popsize);
        tracing::info!(
            generation = record.generation,
            best = record.best_reward,
            current = record.current_reward,
            mean = record.mean_reward.unwrap_or(f64::NAN),
            invalid = record.invalid,
            sigma = record.sigma,
            "generation complete"
        );

        self.history.push(record.clone());
        Ok(record)
    }

    /// Run up to `config.generations` generations against `evaluator`.
    pub fn run<E: Evaluator + ?Sized>(&mut self, evaluator: &mut E) -> Result<RunSummary> {
        let mut generations_run = 0;
        let mut stopped_early = false;

        while generations_run < self.config.generations {
            self.step(evaluator)?;
            generations_run += 1;

            if let ProgressStatus::Stagnant(reason) = self.monitor.status() {
                tracing::warn!(%reason, "stopping phase early");
                stopped_early = true;
                break;
            }
        }

        Ok(RunSummary {
            generations_run,
            stopped_early,
            best: self.optimizer.current_best(),
            progress: self.monitor.report(),
        })
    }

    pub fn optimizer(&self) -> &GeneticOptimizer<F, R> {
        &self.optimizer
    }

    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    pub fn monitor(&self) -> &ProgressMonitor {
        &self.monitor
    }

    /// Reset stagnation tracking, e.g. before switching evaluators.
    pub fn reset_monitor(&mut self) {
        self.monitor = ProgressMonitor::new(self.config.window, self.config.patience);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::GaConfig;
    use crate::runtime::evaluator::FnEvaluator;
    use crate::runtime::objectives::{Objective, ObjectiveEvaluator};

    fn config() -> GaConfig {
        GaConfig {
            num_params: 5,
            popsize: 40,
            elite_ratio: 0.1,
            immigrant_ratio: 0.2,
            sigma_init: 0.1,
            sigma_decay: 0.99,
            sigma_limit: 0.01,
            weight_decay: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_improves_sphere() {
        let opt = GeneticOptimizer::seeded(config(), 21).unwrap();
        let mut driver = EvolutionDriver::new(
            opt,
            DriverConfig {
                generations: 60,
                ..Default::default()
            },
        );
        let mut eval = ObjectiveEvaluator::new(Objective::Sphere { target: 0.5 }, 0).unwrap();

        let summary = driver.run(&mut eval).unwrap();
        assert_eq!(summary.generations_run, 60);
        assert!(!summary.stopped_early);
        assert_eq!(driver.history().len(), 60);
        assert_eq!(eval.evaluations, 60 * 40);

        let first = driver.history()[0].best_reward;
        assert!(summary.best.best_reward >= first);
        assert!(summary.best.best_reward > 0.9, "best = {}", summary.best.best_reward);
        assert!(driver
            .history()
            .windows(2)
            .all(|w| w[1].best_reward >= w[0].best_reward));
        // No weight decay: the generation best is the raw maximum.
        assert!(driver
            .history()
            .iter()
            .all(|r| r.max_reward == Some(r.current_reward)));
        assert!(summary.progress.window_max_best.unwrap() <= summary.best.best_reward);
    }

    #[test]
    fn test_phases_share_state() {
        let opt = GeneticOptimizer::seeded(config(), 5).unwrap();
        let mut driver = EvolutionDriver::new(
            opt,
            DriverConfig {
                generations: 10,
                ..Default::default()
            },
        );

        let mut real = ObjectiveEvaluator::new(Objective::Sphere { target: 0.5 }, 1).unwrap();
        driver.run(&mut real).unwrap();
        let after_real = driver.optimizer().best_reward();

        let mut surrogate = FnEvaluator::new(|pop| vec![0.5; pop.nrows()]);
        driver.reset_monitor();
        let summary = driver.run(&mut surrogate).unwrap();

        assert_eq!(driver.optimizer().generation(), 20);
        assert_eq!(summary.best.best_reward, after_real);
    }

    #[test]
    fn test_stagnation_stops_early() {
        let opt = GeneticOptimizer::seeded(config(), 8).unwrap();
        let mut driver = EvolutionDriver::new(
            opt,
            DriverConfig {
                generations: 100,
                patience: Some(5),
                window: 10,
            },
        );
        let mut flat = FnEvaluator::new(|pop| vec![1.0; pop.nrows()]);
        let summary = driver.run(&mut flat).unwrap();

        assert!(summary.stopped_early);
        assert_eq!(summary.generations_run, 6);
        assert!(matches!(summary.progress.status, ProgressStatus::Stagnant(_)));
    }

    #[test]
    fn test_nan_rewards_are_tolerated() {
        let opt = GeneticOptimizer::seeded(config(), 13).unwrap();
        let mut driver = EvolutionDriver::new(
            opt,
            DriverConfig {
                generations: 15,
                ..Default::default()
            },
        );
        let obj = Objective::NoisySphere {
            target: 0.5,
            noise: 0.01,
            nan_rate: 0.2,
        };
        let mut eval = ObjectiveEvaluator::new(obj, 2).unwrap();
        driver.run(&mut eval).unwrap();

        assert!(driver.history().iter().any(|r| r.invalid > 0));
        assert!(driver.history().iter().all(|r| r.current_reward.is_finite()));
        assert!(driver
            .history()
            .iter()
            .all(|r| r.max_reward.is_some_and(f64::is_finite)));
    }

    #[test]
    fn test_bad_evaluator_length_surfaces() {
        let opt = GeneticOptimizer::seeded(config(), 1).unwrap();
        let mut driver = EvolutionDriver::new(opt, DriverConfig::default());
        let mut short = FnEvaluator::new(|pop| vec![1.0; pop.nrows() - 1]);

        let err = driver.step(&mut short).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::GaError>(),
            Some(crate::GaError::InvalidInput { .. })
        ));
        assert!(driver.history().is_empty());
    }
}
