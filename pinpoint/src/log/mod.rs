//! Logging setup.
//!
//! Installs a `tracing` subscriber with an `EnvFilter` (honoring
//! `RUST_LOG`) and local-time timestamps. Two variants:
//!
//! - [`init`] logs to stderr, for one-shot commands.
//! - [`init_with_file`] logs to a daily-rolled file instead, for the
//!   interactive session where stderr would garble the terminal. The
//!   returned guard must be held for the process lifetime or buffered
//!   lines are lost.
//!
//! Either may be called at most once per process.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Timestamp format used on every log line.
const TIME_FORMAT: &str = "[hour]:[minute]:[second].[subsecond digits:3]";

/// Directory for rolled log files (`~/.local/share/pinpoint/logs` on
/// Linux).
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pinpoint")
        .join("logs")
}

/// Errors from installing the logger.
#[derive(Debug, Error)]
pub enum LogError {
    /// The timestamp format description failed to parse.
    #[error("invalid time format: {0}")]
    TimeFormat(#[from] time::error::InvalidFormatDescription),

    /// A global subscriber was already installed.
    #[error("failed to install logger: {0}")]
    Init(String),
}

/// Default filter directives when `RUST_LOG` is not set.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "info,pinpoint=debug"
    } else {
        "info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(verbose).into())
}

/// Install a stderr logger.
pub fn init(verbose: bool) -> Result<(), LogError> {
    let timer = LocalTime::new(time::format_description::parse(TIME_FORMAT)?);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))?;

    Ok(())
}

/// Install a file logger rolling daily under `directory`.
///
/// Returns the guard flushing the non-blocking writer; drop it only at
/// process exit.
pub fn init_with_file(verbose: bool, directory: &Path) -> Result<WorkerGuard, LogError> {
    let timer = LocalTime::new(time::format_description::parse(TIME_FORMAT)?);

    let appender = tracing_appender::rolling::daily(directory, "pinpoint.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_timer(timer)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(false), "info");
        assert_eq!(default_directives(true), "info,pinpoint=debug");
    }

    #[test]
    fn test_time_format_parses() {
        assert!(time::format_description::parse(TIME_FORMAT).is_ok());
    }

    #[test]
    fn test_log_directory_shape() {
        assert!(log_directory().ends_with("pinpoint/logs"));
    }
}
