//! CLI error types.

use std::fmt;

use pinpoint::config::ConfigError;
use pinpoint::geocode::GatewayError;
use pinpoint::log::LogError;
use pinpoint::session::SessionError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid command-line input.
    Args(String),
    /// Configuration load, save, or key errors.
    Config(String),
    /// Geocoding gateway construction or request failure.
    Gateway(GatewayError),
    /// Picker session failure.
    Session(String),
    /// Logging could not be initialized.
    Log(String),
    /// Terminal or stdin failure.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Args(msg) => write!(f, "{}", msg),
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::Gateway(e) => write!(f, "gateway error: {}", e),
            CliError::Session(msg) => write!(f, "session error: {}", msg),
            CliError::Log(msg) => write!(f, "logging error: {}", msg),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Gateway(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<GatewayError> for CliError {
    fn from(e: GatewayError) -> Self {
        CliError::Gateway(e)
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e.to_string())
    }
}

impl From<LogError> for CliError {
    fn from(e: LogError) -> Self {
        CliError::Log(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
