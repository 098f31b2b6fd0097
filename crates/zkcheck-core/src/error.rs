//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while assembling a check's configuration.
///
/// All of these are detected before any node is probed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid values for \"warning\" and \"critical\"")]
    InvalidBounds,

    #[error("You should specify a key name.")]
    MissingKey,

    #[error("invalid endpoint: {0:?} (expected host:port)")]
    InvalidEndpoint(String),

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("the list of servers is mandatory")]
    NoServers,

    #[error("undefined handler: {name} (available: {})", .available.join(", "))]
    UnknownProfile {
        name: String,
        available: Vec<&'static str>,
    },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Whether the error concerns the threshold inputs (reported as CRITICAL).
    pub fn is_threshold_error(&self) -> bool {
        matches!(self, ConfigError::InvalidBounds | ConfigError::MissingKey)
    }
}
