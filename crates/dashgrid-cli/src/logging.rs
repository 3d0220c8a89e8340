//! Subscriber setup for the `dashgrid` binary.
//!
//! Logs go to stderr so stdout stays clean for JSON and rendered grids.
//! `RUST_LOG`, when set, wins over `--log-level`.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Build the filter: `RUST_LOG` if set and valid, else `level`.
pub fn filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|error| CliError::Logging {
            message: format!("invalid log level {level:?}: {error}"),
        }),
    }
}

/// Install the global subscriber. Call once, from `main`.
pub fn init(format: LogFormat, level: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(level)?)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|error| CliError::Logging {
        message: error.to_string(),
    })
}
