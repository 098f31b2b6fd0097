//! Output profile registry.
//!
//! Maps `--output` names to classifiers. The set is fixed at compile time
//! and checked before any node is probed.

use zkcheck_core::ConfigError;

use crate::classifier::{Classifier, NagiosClassifier};

static NAGIOS: NagiosClassifier = NagiosClassifier;

static PROFILES: &[&dyn Classifier] = &[&NAGIOS];

/// Every valid profile name.
pub fn names() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.name()).collect()
}

/// Resolve a profile by name, ignoring case.
pub fn lookup(name: &str) -> Result<&'static dyn Classifier, ConfigError> {
    let wanted = name.trim();
    PROFILES
        .iter()
        .copied()
        .find(|p| p.name().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ConfigError::UnknownProfile {
            name: name.to_string(),
            available: names(),
        })
}
