//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser};
use jiff::civil::Date;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Brewcart quote configuration
#[derive(Debug, Parser)]
#[command(name = "brewcart-cli", about = "Price a checkout scenario", long_about = None)]
pub struct QuoteConfig {
    /// Scenario YAML file
    #[arg(short, long, env = "BREWCART_SCENARIO")]
    pub scenario: PathBuf,

    /// Evaluate policies on this date (YYYY-MM-DD) instead of the scenario's date
    #[arg(short, long, env = "BREWCART_TODAY")]
    pub today: Option<Date>,

    /// Print the checkout request payload as JSON
    #[arg(long, env = "BREWCART_JSON", default_value_t = false)]
    pub json: bool,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl QuoteConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
