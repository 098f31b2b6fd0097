//! zkcheck-health: ZooKeeper ensemble probing and threshold checks.
//!
//! Queries every node over the four letter word admin protocol, parses
//! the replies into typed stats, and reduces one metric across the
//! ensemble to a Nagios-style verdict.
//!
//! # Architecture
//!
//! ```text
//! ClusterCollector::collect(endpoints)
//!   ├── per endpoint (bounded by a semaphore)
//!   │   ├── probe(mntr) ──non-empty──► parse_mntr
//!   │   └── probe(stat) ◄──empty───── parse_stat
//!   └── ClusterSnapshot (configured order, unreachable nodes omitted)
//!
//! profile::lookup(name) → &dyn Classifier
//!   └── classify(snapshot, ThresholdSpec) → Verdict
//! ```
//!
//! # Failure handling
//!
//! Probe failures are per node: the node is logged and left out of the
//! snapshot. Malformed reply lines are skipped. Only a metric missing
//! from every node turns into a CRITICAL "not found" verdict.

pub mod classifier;
pub mod collector;
pub mod error;
pub mod parser;
pub mod probe;
pub mod profile;

pub use classifier::{Classifier, NagiosClassifier, classify_value};
pub use collector::{ClusterCollector, fetch_stats};
pub use error::{ProbeError, ProbePhase, ProbeResult};
pub use parser::{MalformedLine, parse_mntr, parse_stat};
pub use probe::{Command, MAX_RESPONSE_BYTES, probe};
