use crate::domain::{DEFAULT_TEAM, DEFAULT_YEARS};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Sources to scrape, comma separated, or `all`
    #[arg(long, env = "COURTSIDE_SOURCES", default_value = "all", value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Seasons to scrape, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_YEARS)]
    pub years: Vec<u16>,

    /// Team whose roster is scraped
    #[arg(long, env = "COURTSIDE_TEAM", default_value = DEFAULT_TEAM)]
    pub team: String,

    /// Directory to store output data
    #[arg(long, env = "COURTSIDE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Optional JSON file overriding URL templates, pagination bounds and
    /// timeouts per source
    #[arg(long, env = "COURTSIDE_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Navigation timeout in seconds, for every source
    #[arg(long)]
    pub nav_timeout_secs: Option<u64>,

    /// Multiplier for every fixed settle delay (0 disables them)
    #[arg(long, default_value_t = 1.0)]
    pub settle_scale: f64,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Path to the Chrome/Chromium executable
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Reject rows with unparsable numbers and fail years whose table is
    /// narrower than its schema or whose rows all fail to decode
    #[arg(long)]
    pub strict: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "COURTSIDE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Scrape the selected sources and years (default)
    Scrape,
    /// Add points per game to a transfer-players artifact, in place
    Ppg {
        /// Artifact to update
        path: PathBuf,
    },
}
