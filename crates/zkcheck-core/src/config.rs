//! zkcheck.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Endpoint;

/// Per-probe timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Maximum number of nodes probed at once when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub check: CheckSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub servers: Vec<String>,
    pub timeout: Option<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckSection {
    pub output: Option<String>,
    pub key: Option<String>,
    pub warning: Option<i64>,
    pub critical: Option<i64>,
}

impl CheckConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Resolve the configured server list into endpoints.
    pub fn endpoints(&self) -> ConfigResult<Vec<Endpoint>> {
        Endpoint::parse_list(&self.cluster.servers.join(","))
    }

    pub fn timeout(&self) -> ConfigResult<Duration> {
        match &self.cluster.timeout {
            Some(raw) => {
                parse_duration(raw).ok_or_else(|| ConfigError::InvalidDuration(raw.clone()))
            }
            None => Ok(DEFAULT_TIMEOUT),
        }
    }

    /// Worker count, never below one.
    pub fn concurrency(&self) -> usize {
        self.cluster.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1)
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A bare number is taken as seconds. Zero is rejected since a zero
/// timeout would fail every probe.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let parsed = if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim().parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    };
    parsed.filter(|d| !d.is_zero())
}
