#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that scores a level file with the metric suite.

mod level_file;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use level_eval_system_metrics::{MetricSuite, MetricsConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::level_file::LevelDescription;

/// Scores a level layout against the configured quality metrics.
#[derive(Debug, Parser)]
#[command(name = "level-eval", version)]
struct CliArgs {
    /// TOML file describing the level's rooms and connections.
    #[arg(long, value_name = "FILE")]
    level: PathBuf,

    /// TOML file selecting the metrics to score.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log every computed score and search.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the level evaluation command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => MetricsConfig::load(path)
            .with_context(|| format!("failed to load metrics config {}", path.display()))?,
        None => MetricsConfig::default(),
    };
    let mut suite = MetricSuite::from_config(&config).context("invalid metric suite")?;

    let level = LevelDescription::load(&args.level)?.build()?;
    let report = suite.score(&level);

    for score in report.iter() {
        match score.result() {
            Ok(value) => println!("{}\t{value:.4}", score.title()),
            Err(error) => println!("{}\tn/a ({error})", score.title()),
        }
    }

    let _ = suite.finish_level(level.id());
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "level_eval=debug" } else { "level_eval=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
