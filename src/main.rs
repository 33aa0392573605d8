//! popsearch CLI.
//!
//! Runs the genetic optimizer against a benchmark objective and reports the
//! best individual found.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use popsearch::runtime::{DriverConfig, EvolutionDriver, Objective, ObjectiveEvaluator};
use popsearch::{GaConfig, GeneticOptimizer, SelectionScan};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ObjectiveKind {
    Sphere,
    Rastrigin,
    NoisySphere,
}

/// popsearch benchmark CLI.
#[derive(Parser, Debug)]
#[command(
    name = "popsearch",
    about = "Ask/tell genetic optimizer on benchmark objectives",
    version
)]
struct Cli {
    /// JSON file with optimizer hyper-parameters; flags override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Benchmark objective.
    #[arg(long, value_enum, default_value_t = ObjectiveKind::Sphere)]
    objective: ObjectiveKind,

    /// Optimum coordinate of the objective.
    #[arg(long, default_value_t = 0.5)]
    target: f64,

    /// Standard deviation of reward noise (noisy-sphere).
    #[arg(long, default_value_t = 0.01)]
    noise: f64,

    /// Fraction of evaluations that fail with NaN (noisy-sphere).
    #[arg(long, default_value_t = 0.05)]
    nan_rate: f64,

    #[arg(long)]
    num_params: Option<usize>,

    #[arg(long)]
    popsize: Option<usize>,

    #[arg(long)]
    elite_ratio: Option<f64>,

    #[arg(long)]
    immigrant_ratio: Option<f64>,

    #[arg(long)]
    sigma_init: Option<f64>,

    #[arg(long)]
    sigma_decay: Option<f64>,

    #[arg(long)]
    sigma_limit: Option<f64>,

    #[arg(long)]
    weight_decay: Option<f64>,

    /// Scan the reward CDF from index 0 and skip masked rows.
    #[arg(long, default_value_t = false)]
    corrected_selection: bool,

    /// Number of generations.
    #[arg(short = 'g', long, default_value_t = 100)]
    generations: usize,

    /// Stop after this many generations without improvement.
    #[arg(long)]
    patience: Option<usize>,

    /// Random seed for the optimizer (the evaluator uses seed + 1).
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Print the run summary and history as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Cli {
    fn ga_config(&self) -> Result<GaConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config '{}'", path.display()))?;
                serde_json::from_str::<GaConfig>(&text)
                    .with_context(|| format!("failed to parse config '{}'", path.display()))?
            }
            None => GaConfig::default(),
        };

        if let Some(v) = self.num_params {
            config.num_params = v;
        }
        if let Some(v) = self.popsize {
            config.popsize = v;
        }
        if let Some(v) = self.elite_ratio {
            config.elite_ratio = v;
        }
        if let Some(v) = self.immigrant_ratio {
            config.immigrant_ratio = v;
        }
        if let Some(v) = self.sigma_init {
            config.sigma_init = v;
        }
        if let Some(v) = self.sigma_decay {
            config.sigma_decay = v;
        }
        if let Some(v) = self.sigma_limit {
            config.sigma_limit = v;
        }
        if let Some(v) = self.weight_decay {
            config.weight_decay = v;
        }
        if self.corrected_selection {
            config.selection = SelectionScan::Corrected;
        }
        Ok(config)
    }

    fn objective(&self) -> Result<Objective> {
        if !(0.0..=1.0).contains(&self.nan_rate) {
            bail!("nan-rate must lie in [0, 1], got {}", self.nan_rate);
        }
        Ok(match self.objective {
            ObjectiveKind::Sphere => Objective::Sphere {
                target: self.target,
            },
            ObjectiveKind::Rastrigin => Objective::Rastrigin {
                target: self.target,
            },
            ObjectiveKind::NoisySphere => Objective::NoisySphere {
                target: self.target,
                noise: self.noise,
                nan_rate: self.nan_rate,
            },
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tracing::info!("popsearch v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.ga_config()?;
    let objective = cli.objective()?;

    tracing::info!(
        "Config: {} params, popsize {}, {} elites, {} immigrants, sigma {} -> {}",
        config.num_params,
        config.popsize,
        config.elite_popsize(),
        config.immigrant_popsize(),
        config.sigma_init,
        config.sigma_limit,
    );
    tracing::info!("Objective: {:?}", objective);

    let optimizer = GeneticOptimizer::seeded(config, cli.seed)?;
    let mut evaluator = ObjectiveEvaluator::new(objective, cli.seed.wrapping_add(1))?;
    let mut driver = EvolutionDriver::new(
        optimizer,
        DriverConfig {
            generations: cli.generations,
            patience: cli.patience,
            ..Default::default()
        },
    );

    let summary = driver.run(&mut evaluator)?;

    tracing::info!(
        "Ran {} generations ({} evaluations){}",
        summary.generations_run,
        evaluator.evaluations,
        if summary.stopped_early {
            ", stopped early"
        } else {
            ""
        },
    );
    tracing::info!("  Best reward: {:.6}", summary.best.best_reward);
    tracing::info!("  Final sigma: {:.4}", summary.best.sigma);
    tracing::info!("  Best params: {}", summary.best.best_param);

    if cli.json {
        let out = serde_json::json!({
            "summary": summary,
            "history": driver.history(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    }

    Ok(())
}
