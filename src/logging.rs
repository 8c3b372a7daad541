use crate::config::Config;
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "journal.log";
pub const LOG_ENV: &str = "JOURNAL_LOG";

/// Installs the global subscriber.
///
/// The interactive screen owns stdout, so logs go to `journal.log` in the data
/// directory unless `--log-stderr` was given. `JOURNAL_LOG` takes the usual
/// `EnvFilter` directives and defaults to `info`.
pub fn init(config: &Config) -> io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.log_stderr {
        builder.with_writer(io::stderr).init();
        return Ok(());
    }

    fs::create_dir_all(&config.data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.data_dir.join(LOG_FILE_NAME))?;
    builder
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .init();
    Ok(())
}
