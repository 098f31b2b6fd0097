//! zkcheck-core: shared types and configuration for zkcheck.
//!
//! Defines the data model passed between the probe, parser, collector and
//! classifier (`Endpoint`, `StatRecord`, `ClusterSnapshot`, `ThresholdSpec`,
//! `Verdict`) and the `zkcheck.toml` configuration format.

pub mod config;
pub mod error;
pub mod types;

pub use config::CheckConfig;
pub use error::{ConfigError, ConfigResult};
pub use types::*;
