use crate::error::ConfigError;
use crate::query::DEFAULT_PAGE_SIZE;
use crate::weather::{DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL};
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "weather-journal";

#[derive(Debug, Parser)]
#[command(name = "weather-journal")]
#[command(about = "A terminal journal that remembers the weather")]
#[command(version)]
pub struct Cli {
    /// Directory holding entries.json and journal.log
    #[arg(long, env = "JOURNAL_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Entries shown per page
    #[arg(long, env = "JOURNAL_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    pub page_size: NonZeroUsize,

    /// Quiet period after the last search keystroke, in milliseconds
    #[arg(long, default_value_t = 300, global = true)]
    pub debounce_ms: u64,

    #[arg(long, env = "JOURNAL_GEOCODING_URL", default_value = DEFAULT_GEOCODING_URL, global = true)]
    pub geocoding_url: String,

    #[arg(long, env = "JOURNAL_FORECAST_URL", default_value = DEFAULT_FORECAST_URL, global = true)]
    pub forecast_url: String,

    /// Log to stderr instead of journal.log
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print one page of entries
    List(ListArgs),
    /// Count entries by mood
    Moods {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only entries whose title, content, mood or tags contain this text
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Oldest entries first
    #[arg(long)]
    pub oldest: bool,

    /// Only entries dated today
    #[arg(long)]
    pub today: bool,

    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Settings resolved from the command line and environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub page_size: NonZeroUsize,
    pub debounce: Duration,
    pub geocoding_url: String,
    pub forecast_url: String,
    pub log_stderr: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        Ok(Config {
            data_dir,
            page_size: cli.page_size,
            debounce: Duration::from_millis(cli.debounce_ms),
            geocoding_url: cli.geocoding_url.clone(),
            forecast_url: cli.forecast_url.clone(),
            log_stderr: cli.log_stderr,
        })
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoDataDir)
}
