//! Shared helpers for the `train-model` and `predict-price` binaries.

use auction_core::{Config, Error, Result};
use clap::error::ErrorKind;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "AUCTION_PRICE_CONFIG";

/// Install a stderr logger. `RUST_LOG` wins over the default level.
pub fn init_tracing(verbose: bool, default_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read `.env` if present, then load configuration.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    dotenvy::dotenv().ok();
    Config::load(path)
}

/// Success line of the prediction CLI, two decimal places.
pub fn format_prediction(price: f64) -> String {
    format!("{{\"predicted_price\": {:.2}}}", price)
}

/// Failure line of the prediction CLI.
pub fn format_error(err: &Error) -> String {
    serde_json::json!({
        "error": err.to_string(),
        "code": err.code(),
    })
    .to_string()
}

/// Map a command-line parse failure to an `InvalidInput` error. Help and
/// version requests are not failures and yield `None`.
pub fn usage_error(err: &clap::Error) -> Option<Error> {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => None,
        _ => Some(Error::invalid_input(err.to_string().trim())),
    }
}
