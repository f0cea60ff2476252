//! Estimate the final price of a listing from the published model.
//!
//! Prints exactly one JSON object on stdout, argument errors included;
//! logs go to stderr.

use auction_cli::{
    format_error, format_prediction, init_tracing, load_config, usage_error, CONFIG_ENV,
};
use auction_core::{ListingInput, Result};
use auction_model::PredictionService;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Predict an auction's final price
#[derive(Parser, Debug)]
#[command(name = "predict-price", version, about)]
struct Args {
    /// Starting bid price
    #[arg(long = "startingBid")]
    starting_bid: f64,

    /// Auction category
    #[arg(long)]
    category: String,

    /// Item condition
    #[arg(long)]
    condition: String,

    /// Auction duration in days
    #[arg(long = "durationDays", allow_negative_numbers = true)]
    duration_days: i64,

    /// Number of watchers
    #[arg(long, default_value_t = 0)]
    watchers: u32,

    /// Path to a JSON configuration file
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<f64> {
    let config = load_config(args.config.as_deref())?;
    let listing = ListingInput {
        starting_bid: args.starting_bid,
        category: args.category.clone(),
        condition: args.condition.clone(),
        duration_days: args.duration_days,
        watchers: args.watchers,
    };
    let estimate = PredictionService::from_config(&config).predict(&listing)?;
    Ok(estimate.price)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match usage_error(&err) {
            Some(usage) => {
                println!("{}", format_error(&usage));
                return ExitCode::FAILURE;
            }
            None => err.exit(),
        },
    };
    init_tracing(args.verbose, "warn");

    match run(&args) {
        Ok(price) => {
            println!("{}", format_prediction(price));
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", format_error(&err));
            ExitCode::FAILURE
        }
    }
}
