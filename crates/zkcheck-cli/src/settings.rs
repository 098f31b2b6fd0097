//! Layered settings: zkcheck.toml defaults, then command-line flags.

use std::time::Duration;

use zkcheck_core::{CheckConfig, ConfigResult, Endpoint, ThresholdSpec};

use crate::Cli;

/// Fully resolved inputs for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoints: Vec<Endpoint>,
    pub timeout: Duration,
    pub concurrency: usize,
    pub output: Option<String>,
    pub key: Option<String>,
    /// Bounds stay raw until a profile asks for them, so bad input is
    /// reported as a threshold error rather than a usage error.
    pub warning: Option<String>,
    pub critical: Option<String>,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> ConfigResult<Self> {
        let mut config = match &cli.config {
            Some(path) => CheckConfig::from_file(path)?,
            None => CheckConfig::default(),
        };
        apply_flags(&mut config, cli);

        Ok(Self {
            endpoints: config.endpoints()?,
            timeout: config.timeout()?,
            concurrency: config.concurrency(),
            output: cli.output.clone().or(config.check.output),
            key: cli.key.clone().or(config.check.key),
            warning: cli
                .warning
                .clone()
                .or_else(|| config.check.warning.map(|w| w.to_string())),
            critical: cli
                .critical
                .clone()
                .or_else(|| config.check.critical.map(|c| c.to_string())),
        })
    }

    pub fn threshold(&self) -> ConfigResult<ThresholdSpec> {
        ThresholdSpec::parse(
            self.key.as_deref(),
            self.warning.as_deref(),
            self.critical.as_deref(),
        )
    }
}

fn apply_flags(config: &mut CheckConfig, cli: &Cli) {
    if let Some(servers) = &cli.servers {
        config.cluster.servers = vec![servers.clone()];
    }
    if let Some(timeout) = &cli.timeout {
        config.cluster.timeout = Some(timeout.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.cluster.concurrency = Some(concurrency);
    }
}
