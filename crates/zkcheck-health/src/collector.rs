//! Cluster collector: probes every configured node and builds a snapshot.
//!
//! Each node gets its own task. A semaphore bounds how many probes are in
//! flight; results land in one slot per endpoint and are assembled in
//! configured order once every task has finished.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, Span, debug, info, warn};

use zkcheck_core::config::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use zkcheck_core::{ClusterSnapshot, Endpoint, StatRecord};

use crate::error::ProbeResult;
use crate::parser::{parse_mntr, parse_stat};
use crate::probe::{Command, probe};

/// Gathers stats from every node of an ensemble.
#[derive(Debug, Clone)]
pub struct ClusterCollector {
    timeout: Duration,
    concurrency: usize,
    /// Invocation span; every per-node event is recorded under it.
    span: Span,
}

impl Default for ClusterCollector {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_CONCURRENCY)
    }
}

impl ClusterCollector {
    /// Create a collector with a per-probe timeout and a worker bound.
    pub fn new(timeout: Duration, concurrency: usize) -> Self {
        Self {
            timeout,
            concurrency: concurrency.max(1),
            span: Span::none(),
        }
    }

    /// Attach the span that scopes this invocation's log output.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every endpoint and return the stats of those that answered.
    ///
    /// Unreachable nodes are logged and left out; they never abort the
    /// collection of the others.
    pub async fn collect(&self, endpoints: &[Endpoint]) -> ClusterSnapshot {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, endpoint) in endpoints.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let timeout = self.timeout;
            tasks.spawn(
                async move {
                    // Never closed; a failed acquire just runs unbounded.
                    let _permit = semaphore.acquire_owned().await.ok();
                    let result = fetch_stats(&endpoint, timeout).await;
                    (index, endpoint, result)
                }
                .instrument(self.span.clone()),
            );
        }

        let mut slots: Vec<Option<StatRecord>> = vec![None; endpoints.len()];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, endpoint, Ok(record))) => {
                    debug!(parent: &self.span, endpoint = %endpoint, stats = record.len(), "collected node stats");
                    slots[index] = Some(record);
                }
                Ok((_, endpoint, Err(e))) => {
                    info!(parent: &self.span, endpoint = %endpoint, error = %e, "unable to query server, skipping");
                }
                Err(e) => {
                    warn!(parent: &self.span, error = %e, "probe task did not complete");
                }
            }
        }

        let mut snapshot = ClusterSnapshot::new();
        for (endpoint, slot) in endpoints.iter().zip(slots) {
            if let Some(record) = slot {
                snapshot.insert(endpoint.id(), record);
            }
        }

        debug!(
            parent: &self.span,
            configured = endpoints.len(),
            responded = snapshot.len(),
            "cluster collection finished"
        );
        snapshot
    }
}

/// Fetch one node's stats: `mntr` first, `stat` if `mntr` replied with nothing.
///
/// The record always comes from a single reply, never a merge of both.
pub async fn fetch_stats(endpoint: &Endpoint, timeout: Duration) -> ProbeResult<StatRecord> {
    let data = probe(endpoint, Command::Mntr, timeout).await?;
    if !data.is_empty() {
        return Ok(parse_mntr(&data));
    }

    debug!(endpoint = %endpoint, "empty mntr reply, falling back to stat");
    let data = probe(endpoint, Command::Stat, timeout).await?;
    Ok(parse_stat(&data))
}
