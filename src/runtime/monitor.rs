//! Progress monitoring across generations.
//!
//! Rolling windows over per-generation statistics plus a stagnation check on
//! the historical best reward.

use std::collections::VecDeque;

use serde::Serialize;

use super::driver::GenerationRecord;

/// Progress status.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ProgressStatus {
    /// The historical best improved within the patience window.
    Improving,
    /// No improvement for at least `patience` generations.
    Stagnant(String),
}

/// A rolling metric tracker.
#[derive(Clone, Debug)]
pub struct MetricTracker {
    /// Metric name.
    pub name: String,

    /// Rolling window of samples.
    pub samples: VecDeque<f64>,

    /// Maximum window size.
    pub max_samples: usize,
}

impl MetricTracker {
    pub fn new(name: &str, max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            name: name.to_string(),
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record a sample. Non-finite values are dropped.
    pub fn record(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Mean over the window.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Sample standard deviation over the window.
    pub fn std_dev(&self) -> f64 {
        if self.samples.len() < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let var = self
            .samples
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / (self.samples.len() - 1) as f64;
        var.sqrt()
    }

    /// Largest sample in the window, `None` when empty.
    pub fn max(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }
}

/// Tracks generation records and flags stagnation.
#[derive(Clone, Debug)]
pub struct ProgressMonitor {
    /// Best reward of each generation.
    pub current_best: MetricTracker,

    /// Mean valid reward of each generation.
    pub mean_reward: MetricTracker,

    /// Fraction of masked rewards per generation.
    pub invalid_fraction: MetricTracker,

    /// Generations without improvement before declaring stagnation.
    pub patience: Option<usize>,

    best_reward: f64,
    since_improvement: usize,

    /// Generations recorded.
    pub generations: u64,
}

impl ProgressMonitor {
    pub fn new(window: usize, patience: Option<usize>) -> Self {
        Self {
            current_best: MetricTracker::new("current_best", window),
            mean_reward: MetricTracker::new("mean_reward", window),
            invalid_fraction: MetricTracker::new("invalid_fraction", window),
            patience,
            best_reward: f64::NEG_INFINITY,
            since_improvement: 0,
            generations: 0,
        }
    }

    pub fn record(&mut self, record: &GenerationRecord, popsize: usize) {
        self.generations += 1;
        self.current_best.record(record.current_reward);
        if let Some(mean) = record.mean_reward {
            self.mean_reward.record(mean);
        }
        self.invalid_fraction
            .record(record.invalid as f64 / popsize.max(1) as f64);

        if record.best_reward > self.best_reward {
            self.best_reward = record.best_reward;
            self.since_improvement = 0;
        } else {
            self.since_improvement += 1;
        }
    }

    /// Generations since the historical best last improved.
    pub fn since_improvement(&self) -> usize {
        self.since_improvement
    }

    pub fn status(&self) -> ProgressStatus {
        match self.patience {
            Some(patience) if self.since_improvement >= patience => {
                ProgressStatus::Stagnant(format!(
                    "best {:.6} unchanged for {} generations",
                    self.best_reward, self.since_improvement
                ))
            }
            _ => ProgressStatus::Improving,
        }
    }

    pub fn report(&self) -> ProgressReport {
        ProgressReport {
            status: self.status(),
            generations: self.generations,
            best_reward: self.best_reward,
            window_mean_best: self.current_best.mean(),
            window_std_best: self.current_best.std_dev(),
            window_max_best: self.current_best.max(),
            window_mean_reward: self.mean_reward.mean(),
            window_invalid_fraction: self.invalid_fraction.mean(),
        }
    }
}

/// A progress snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct ProgressReport {
    pub status: ProgressStatus,
    pub generations: u64,
    pub best_reward: f64,
    pub window_mean_best: f64,
    pub window_std_best: f64,
    pub window_max_best: Option<f64>,
    pub window_mean_reward: f64,
    pub window_invalid_fraction: f64,
}
