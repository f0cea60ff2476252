//! Train the price model from historical auctions and publish the bundle.

use anyhow::{Context, Result};
use auction_cli::{init_tracing, load_config, CONFIG_ENV};
use auction_ingestion::open_source;
use auction_model::TrainingJob;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Train the auction price model
#[derive(Parser, Debug)]
#[command(name = "train-model", version, about)]
struct Args {
    /// Path to a JSON configuration file
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, "info");

    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    let source = open_source(&config.source).context("opening historical data source")?;

    let report = TrainingJob::new(&config, source)
        .run()
        .context("training failed")?;

    info!(
        fetched = report.fetched,
        accepted = report.preprocess.accepted,
        excluded = report.preprocess.excluded(),
        "Training complete"
    );
    println!("Model Performance:");
    println!("Mean Squared Error: {}", report.metrics.mse);
    println!("R-squared Score: {}", report.metrics.r2);
    println!("Bundle: {}", report.bundle_path.display());
    Ok(())
}
