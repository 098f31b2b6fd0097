//! Shared types used across zkcheck crates.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// Default ZooKeeper client port, used when an endpoint omits one.
pub const DEFAULT_PORT: u16 = 2181;

/// One node of the ensemble, addressed by host and admin port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Snapshot identifier, always `host:port`.
    pub fn id(&self) -> String {
        self.to_string()
    }

    /// Parse a comma-separated `host:port` list.
    ///
    /// Blank items (e.g. a trailing comma) are ignored; an empty list is an error.
    pub fn parse_list(s: &str) -> Result<Vec<Endpoint>, ConfigError> {
        let endpoints = s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(Endpoint::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if endpoints.is_empty() {
            return Err(ConfigError::NoServers);
        }
        Ok(endpoints)
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidEndpoint(s.to_string());

        // Bracketed IPv6: "[::1]:2181" or "[::1]".
        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            match tail {
                "" => (host, None),
                _ => (host, Some(tail.strip_prefix(':').ok_or_else(invalid)?)),
            }
        } else {
            match s.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (s, None),
            }
        };

        if host.is_empty() {
            return Err(invalid());
        }
        let port = match port {
            Some(p) => p.parse::<u16>().map_err(|_| invalid())?,
            None => DEFAULT_PORT,
        };

        Ok(Endpoint::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// A single statistic reported by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Text(String),
}

impl StatValue {
    /// Coerce raw text: integers become `Int`, everything else stays text.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => StatValue::Int(n),
            Err(_) => StatValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StatValue::Int(n) => Some(*n),
            StatValue::Text(_) => None,
        }
    }
}

impl From<i64> for StatValue {
    fn from(n: i64) -> Self {
        StatValue::Int(n)
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(n) => write!(f, "{n}"),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

/// Metric name → value for one node, in the order the node reported them.
///
/// Keys are never empty. Re-inserting a key keeps its original position.
pub type StatRecord = IndexMap<String, StatValue>;

/// Stats for every node that answered, in configured endpoint order.
///
/// Unreachable nodes have no entry at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSnapshot {
    nodes: Vec<(String, StatRecord)>,
}

impl ClusterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node's record. A repeated id replaces the earlier record in place.
    pub fn insert(&mut self, id: impl Into<String>, record: StatRecord) {
        let id = id.into();
        match self.nodes.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = record,
            None => self.nodes.push((id, record)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&StatRecord> {
        self.nodes
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatRecord)> {
        self.nodes.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Serialize for ClusterSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for (id, record) in &self.nodes {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

/// Nagios service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Critical,
}

impl Status {
    /// Plugin exit code: 0 OK, 1 WARNING, 2 CRITICAL.
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated warning/critical bounds for one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdSpec {
    pub warning: i64,
    pub critical: i64,
    pub metric_key: String,
}

impl ThresholdSpec {
    /// Build a spec from raw operator input.
    ///
    /// Bounds are checked before the key, so an operator who forgot
    /// everything sees the bounds complaint first.
    pub fn parse(
        key: Option<&str>,
        warning: Option<&str>,
        critical: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let bound = |raw: Option<&str>| -> Result<i64, ConfigError> {
            raw.map(str::trim)
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(ConfigError::InvalidBounds)
        };
        let warning = bound(warning)?;
        let critical = bound(critical)?;

        let metric_key = match key.map(str::trim) {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => return Err(ConfigError::MissingKey),
        };

        Ok(Self {
            warning,
            critical,
            metric_key,
        })
    }
}

/// Outcome of one check invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub status: Status,
    /// One-line explanation, suitable as plugin output.
    pub detail: String,
    /// Nodes responsible for `status` (empty for OK).
    pub offenders: Vec<String>,
    pub warning_nodes: Vec<String>,
    pub critical_nodes: Vec<String>,
    /// Every observed `(node, value)` pair for the metric, numeric or not.
    pub values: Vec<(String, StatValue)>,
}

impl Verdict {
    /// A verdict with no per-node data, e.g. for configuration failures.
    pub fn bare(status: Status, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            offenders: Vec::new(),
            warning_nodes: Vec::new(),
            critical_nodes: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.status.exit_code()
    }
}
