//! Probe error types.

use std::fmt;

use thiserror::Error;

/// Which part of a probe exceeded its timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePhase {
    Connect,
    Read,
}

impl fmt::Display for ProbePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbePhase::Connect => f.write_str("connect"),
            ProbePhase::Read => f.write_str("read"),
        }
    }
}

/// A node could not be queried. Always scoped to a single endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unable to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase} timed out for {endpoint}")]
    Timeout { endpoint: String, phase: ProbePhase },

    #[error("i/o error talking to {endpoint}: {source}")]
    Io {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    pub fn endpoint(&self) -> &str {
        match self {
            ProbeError::Connect { endpoint, .. }
            | ProbeError::Timeout { endpoint, .. }
            | ProbeError::Io { endpoint, .. } => endpoint,
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;
