//! Stats parsers for the `mntr` and `stat` replies.
//!
//! Both parsers are total: bad lines are skipped and empty input yields
//! an empty record.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::trace;

use zkcheck_core::{StatRecord, StatValue};

/// Why a `mntr` line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLine {
    #[error("expected 2 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("the key is mandatory and should not be empty")]
    EmptyKey,
}

/// Parse one `key<TAB>value` line from a `mntr` reply.
pub fn parse_mntr_line(line: &str) -> Result<(String, StatValue), MalformedLine> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    let [key, value] = fields.as_slice() else {
        return Err(MalformedLine::FieldCount(fields.len()));
    };
    if key.is_empty() {
        return Err(MalformedLine::EmptyKey);
    }
    Ok((key.to_string(), StatValue::coerce(value)))
}

/// Parse a `mntr` reply. Later duplicates overwrite earlier ones.
pub fn parse_mntr(data: &[u8]) -> StatRecord {
    let text = String::from_utf8_lossy(data);
    let mut record = StatRecord::new();

    for line in text.lines() {
        match parse_mntr_line(line) {
            Ok((key, value)) => {
                record.insert(key, value);
            }
            Err(e) => trace!(line = %line, error = %e, "skipping malformed mntr line"),
        }
    }

    record
}

/// One fixed-layout line of the `stat` reply and the keys its groups feed.
struct StatPattern {
    regex: Regex,
    keys: &'static [&'static str],
    numeric: bool,
}

impl StatPattern {
    fn new(pattern: &str, keys: &'static [&'static str], numeric: bool) -> Self {
        Self {
            regex: Regex::new(pattern).expect("stat pattern must compile"),
            keys,
            numeric,
        }
    }
}

static STAT_PATTERNS: LazyLock<Vec<StatPattern>> = LazyLock::new(|| {
    vec![
        StatPattern::new(
            r"^Latency min/avg/max: (\d+)/(\d+)/(\d+)",
            &["zk_min_latency", "zk_avg_latency", "zk_max_latency"],
            true,
        ),
        StatPattern::new(r"^Received: (\d+)", &["zk_packets_received"], true),
        StatPattern::new(r"^Sent: (\d+)", &["zk_packets_sent"], true),
        StatPattern::new(r"^Outstanding: (\d+)", &["zk_outstanding_requests"], true),
        StatPattern::new(r"^Mode: (.*)", &["zk_server_state"], false),
        StatPattern::new(r"^Node count: (\d+)", &["zk_znode_count"], true),
    ]
});

/// Parse a legacy `stat` reply.
///
/// Layout: a version banner, the client list up to the first blank line,
/// then the summary lines matched against the fixed stat patterns. Fields that
/// do not appear are left out of the record.
pub fn parse_stat(data: &[u8]) -> StatRecord {
    let text = String::from_utf8_lossy(data);
    let mut record = StatRecord::new();
    let mut lines = text.lines();

    if let Some(banner) = lines.next()
        && let Some((_, version)) = banner.split_once(':')
    {
        record.insert("zk_version".to_string(), StatValue::Text(version.trim().to_string()));
    }

    // Client connection list, terminated by a blank line.
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
    }

    for line in lines {
        let Some((pattern, caps)) = STAT_PATTERNS
            .iter()
            .find_map(|p| p.regex.captures(line).map(|caps| (p, caps)))
        else {
            continue;
        };

        for (key, group) in pattern.keys.iter().zip(caps.iter().skip(1)) {
            let Some(group) = group else { continue };
            let value = if pattern.numeric {
                StatValue::coerce(group.as_str())
            } else {
                StatValue::Text(group.as_str().to_string())
            };
            record.insert((*key).to_string(), value);
        }
    }

    record
}
