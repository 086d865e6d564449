use anyhow::{Context, Result};
use clap::Parser;
use elitist_aco::{load_path, Colony, ColonyConfig, IterationStats, RunReport};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "elitist-aco")]
#[command(about = "Approximate a TSP instance with elitist ant colony optimization")]
#[command(version)]
struct Args {
    /// Instance file: TSPLIB XML (`.xml`), JSON (`.json`) or TSPLIB full-matrix text
    instance: PathBuf,

    /// JSON file with colony parameters; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ants per iteration
    #[arg(short, long)]
    ants: Option<usize>,

    /// Evaporation rate in [0, 1]
    #[arg(short, long)]
    evaporation: Option<f64>,

    /// Number of iterations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Pheromone exponent
    #[arg(long)]
    alpha: Option<f64>,

    /// Heuristic exponent
    #[arg(long)]
    beta: Option<f64>,

    /// Start city index
    #[arg(long)]
    start: Option<usize>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write per-iteration stats here (CSV for `.csv`, JSON otherwise)
    #[arg(long)]
    stats_out: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn colony_config(&self) -> Result<ColonyConfig> {
        let mut config = match &self.config {
            Some(path) => ColonyConfig::from_json_path(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => ColonyConfig::default(),
        };
        if let Some(ants) = self.ants {
            config.ant_count = ants;
        }
        if let Some(rate) = self.evaporation {
            config.evaporation_rate = rate;
        }
        if let Some(iterations) = self.iterations {
            config.max_iterations = iterations;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            config.beta = beta;
        }
        if let Some(start) = self.start {
            config.start_city = start;
        }
        if self.seed.is_some() {
            config.random_seed = self.seed;
        }
        Ok(config)
    }
}

fn write_stats(path: &Path, report: &RunReport) -> Result<()> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let body = if is_csv {
        report.to_csv()
    } else {
        serde_json::to_string_pretty(&report.history)?
    };
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let start = Instant::now();

    let distances = load_path(&args.instance)
        .with_context(|| format!("loading {}", args.instance.display()))?;
    let mut colony = Colony::new(distances, args.colony_config()?)?;

    let report = colony.run(&mut |_: &IterationStats| {})?;

    info!(seconds = start.elapsed().as_secs_f64(), "run finished");

    for ant in &report.ants {
        println!("Ant {} best iteration: {}", ant.ant_id, ant.best_iteration);
        println!("Best route: {:?}", ant.best_path);
        println!("Best distance: {}\n", ant.best_distance);
    }
    if let Some((distance, path)) = colony.best_path() {
        println!("Colony best: {distance} via {path:?}");
    }

    if let Some(path) = &args.stats_out {
        write_stats(path, &report)?;
        info!(path = %path.display(), "stats written");
    }

    Ok(())
}
