//! Threshold classification of one metric across the ensemble.
//!
//! The comparison is directional: when `critical > warning` higher values
//! are worse, when `critical < warning` lower values are worse. The same
//! code path serves both, so no direction flag is needed.
//!
//! ```text
//! ascending  (w=5,  c=10):  ..5 OK | 6..9 WARNING | 10.. CRITICAL
//! descending (w=10, c=5):  10.. OK | 6..9 WARNING | ..5  CRITICAL
//! collapsed  (w=c=5):       ..4 OK | 5 WARNING    | 6..  OK
//! ```

use tracing::{debug, info};

use zkcheck_core::{ClusterSnapshot, Status, ThresholdSpec, Verdict};

/// Capability shared by every output profile.
pub trait Classifier: Send + Sync {
    /// Registry name, as accepted by `--output`.
    fn name(&self) -> &'static str;

    /// Reduce a snapshot to a single verdict.
    fn classify(&self, snapshot: &ClusterSnapshot, spec: &ThresholdSpec) -> Verdict;
}

/// Classify a single value against the bounds.
pub fn classify_value(warning: i64, critical: i64, value: i64) -> Status {
    if warning == critical {
        // Direction is unknown; only the boundary itself warns.
        return if value == warning {
            Status::Warning
        } else {
            Status::Ok
        };
    }

    let critical_reached = (warning < critical && critical <= value)
        || (warning > critical && critical >= value);
    if critical_reached {
        return Status::Critical;
    }

    let past_warning = (warning < value && value < critical) || (warning > value && value > critical);
    if past_warning {
        Status::Warning
    } else {
        Status::Ok
    }
}

/// Nagios plugin semantics: worst node wins, exit code from the status.
#[derive(Debug, Clone, Copy, Default)]
pub struct NagiosClassifier;

impl Classifier for NagiosClassifier {
    fn name(&self) -> &'static str {
        "nagios"
    }

    fn classify(&self, snapshot: &ClusterSnapshot, spec: &ThresholdSpec) -> Verdict {
        let key = &spec.metric_key;
        let mut values = Vec::new();
        let mut warning_nodes = Vec::new();
        let mut critical_nodes = Vec::new();

        for (node, record) in snapshot.iter() {
            let Some(value) = record.get(key) else {
                continue;
            };
            values.push((node.to_string(), value.clone()));

            let Some(n) = value.as_int() else {
                debug!(node, %key, %value, "non-numeric value, not classified");
                continue;
            };
            match classify_value(spec.warning, spec.critical, n) {
                Status::Critical => critical_nodes.push(node.to_string()),
                Status::Warning => warning_nodes.push(node.to_string()),
                Status::Ok => {}
            }
        }

        if values.is_empty() {
            // ZooKeeper may be down, not serving requests, or misconfigured.
            let detail = format!("CRITICAL - \"{key}\" not found");
            info!(
                %key,
                nodes = snapshot.len(),
                "metric not reported by any node"
            );
            return Verdict::bare(Status::Critical, detail);
        }

        let rendered = values
            .iter()
            .map(|(_, v)| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let (status, offenders) = if !critical_nodes.is_empty() {
            (Status::Critical, critical_nodes.clone())
        } else if !warning_nodes.is_empty() {
            (Status::Warning, warning_nodes.clone())
        } else {
            (Status::Ok, Vec::new())
        };

        let detail = match status {
            Status::Ok => format!("OK - \"{key}\" : {rendered}"),
            _ => format!("{status} - \"{key}\" {} : {rendered}", offenders.join(", ")),
        };

        match status {
            Status::Critical => info!(%key, offenders = ?offenders, "threshold breached"),
            Status::Warning => info!(%key, offenders = ?offenders, "threshold warning"),
            Status::Ok => info!(%key, nodes = values.len(), "all nodes within thresholds"),
        }

        Verdict {
            status,
            detail,
            offenders,
            warning_nodes,
            critical_nodes,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;
    use zkcheck_core::{StatRecord, StatValue};

    use super::*;

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct LogSink(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogSink {
        type Writer = LogSink;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` under a subscriber filtered at the CLI's default level.
    fn logs_at_default_level<T>(f: impl FnOnce() -> T) -> (T, String) {
        let sink = LogSink::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(sink.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let logged = String::from_utf8_lossy(&sink.0.lock().unwrap()).into_owned();
        (out, logged)
    }

    fn spec(key: &str, warning: i64, critical: i64) -> ThresholdSpec {
        ThresholdSpec {
            warning,
            critical,
            metric_key: key.to_string(),
        }
    }

    fn snapshot(nodes: Vec<(&str, Vec<(&str, StatValue)>)>) -> ClusterSnapshot {
        let mut snap = ClusterSnapshot::new();
        for (node, stats) in nodes {
            let record: StatRecord = stats
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            snap.insert(node, record);
        }
        snap
    }

    #[test]
    fn ascending_boundaries() {
        assert_eq!(classify_value(5, 10, 3), Status::Ok);
        assert_eq!(classify_value(5, 10, 5), Status::Ok);
        assert_eq!(classify_value(5, 10, 7), Status::Warning);
        assert_eq!(classify_value(5, 10, 10), Status::Critical);
        assert_eq!(classify_value(5, 10, 1000), Status::Critical);
    }

    #[test]
    fn descending_boundaries() {
        assert_eq!(classify_value(10, 5, 20), Status::Ok);
        assert_eq!(classify_value(10, 5, 10), Status::Ok);
        assert_eq!(classify_value(10, 5, 7), Status::Warning);
        assert_eq!(classify_value(10, 5, 5), Status::Critical);
        assert_eq!(classify_value(10, 5, -1), Status::Critical);
    }

    #[test]
    fn equal_bounds_warn_only_at_the_boundary() {
        assert_eq!(classify_value(5, 5, 4), Status::Ok);
        assert_eq!(classify_value(5, 5, 5), Status::Warning);
        assert_eq!(classify_value(5, 5, 500), Status::Ok);
        assert_eq!(classify_value(5, 5, -500), Status::Ok);
    }

    #[test]
    fn equal_bounds_on_lower_is_worse_metric() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_synced_followers", StatValue::Int(4))]),
            ("zk2:2181", vec![("zk_synced_followers", StatValue::Int(3))]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_synced_followers", 2, 2));
        assert_eq!(verdict.status, Status::Ok);
        assert_eq!(verdict.detail, "OK - \"zk_synced_followers\" : 4 3");

        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_synced_followers", StatValue::Int(4))]),
            ("zk2:2181", vec![("zk_synced_followers", StatValue::Int(2))]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_synced_followers", 2, 2));
        assert_eq!(verdict.status, Status::Warning);
        assert_eq!(verdict.offenders, ["zk2:2181"]);
    }

    #[test]
    fn all_ok_verdict_lists_values() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_avg_latency", StatValue::Int(1))]),
            ("zk2:2181", vec![("zk_avg_latency", StatValue::Int(2))]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_avg_latency", 5, 10));

        assert_eq!(verdict.status, Status::Ok);
        assert_eq!(verdict.exit_code(), 0);
        assert_eq!(verdict.detail, "OK - \"zk_avg_latency\" : 1 2");
        assert!(verdict.offenders.is_empty());
    }

    #[test]
    fn critical_dominates_warning() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_avg_latency", StatValue::Int(7))]),
            ("zk2:2181", vec![("zk_avg_latency", StatValue::Int(12))]),
            ("zk3:2181", vec![("zk_avg_latency", StatValue::Int(1))]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_avg_latency", 5, 10));

        assert_eq!(verdict.status, Status::Critical);
        assert_eq!(verdict.exit_code(), 2);
        assert_eq!(verdict.offenders, ["zk2:2181"]);
        assert_eq!(verdict.warning_nodes, ["zk1:2181"]);
        assert_eq!(verdict.critical_nodes, ["zk2:2181"]);
        assert_eq!(verdict.detail, "CRITICAL - \"zk_avg_latency\" zk2:2181 : 7 12 1");
    }

    #[test]
    fn warning_lists_all_warning_nodes() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_outstanding_requests", StatValue::Int(7))]),
            ("zk2:2181", vec![("zk_outstanding_requests", StatValue::Int(8))]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_outstanding_requests", 5, 10));

        assert_eq!(verdict.status, Status::Warning);
        assert_eq!(verdict.exit_code(), 1);
        assert_eq!(
            verdict.detail,
            "WARNING - \"zk_outstanding_requests\" zk1:2181, zk2:2181 : 7 8"
        );
    }

    #[test]
    fn descending_metric_flags_low_values() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_followers", StatValue::Int(2))]),
            ("zk2:2181", vec![("zk_followers", StatValue::Int(4))]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_followers", 4, 2));

        assert_eq!(verdict.status, Status::Critical);
        assert_eq!(verdict.offenders, ["zk1:2181"]);
    }

    #[test]
    fn missing_metric_everywhere_is_critical() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_avg_latency", StatValue::Int(1))]),
            ("zk2:2181", vec![]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_nope", 0, 0));

        assert_eq!(verdict.status, Status::Critical);
        assert_eq!(verdict.detail, "CRITICAL - \"zk_nope\" not found");
        assert!(verdict.values.is_empty());
    }

    #[test]
    fn empty_snapshot_is_critical() {
        let verdict = NagiosClassifier.classify(&ClusterSnapshot::new(), &spec("zk_avg_latency", 5, 10));
        assert_eq!(verdict.status, Status::Critical);
        assert!(verdict.detail.contains("not found"));
    }

    #[test]
    fn text_values_are_shown_but_not_classified() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_server_state", StatValue::from("leader"))]),
            ("zk2:2181", vec![("zk_server_state", StatValue::from("follower"))]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_server_state", 0, 1));

        assert_eq!(verdict.status, Status::Ok);
        assert_eq!(verdict.detail, "OK - \"zk_server_state\" : leader follower");
        assert_eq!(verdict.values.len(), 2);
    }

    #[test]
    fn nodes_without_metric_are_ignored() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_avg_latency", StatValue::Int(11))]),
            ("zk2:2181", vec![("zk_server_state", StatValue::from("follower"))]),
        ]);
        let verdict = NagiosClassifier.classify(&snap, &spec("zk_avg_latency", 5, 10));

        assert_eq!(verdict.status, Status::Critical);
        assert_eq!(verdict.values, [("zk1:2181".to_string(), StatValue::Int(11))]);
    }

    #[test]
    fn verdicts_are_quiet_at_default_level() {
        let snap = snapshot(vec![
            ("zk1:2181", vec![("zk_avg_latency", StatValue::Int(7))]),
            ("zk2:2181", vec![("zk_avg_latency", StatValue::Int(12))]),
        ]);

        let (verdict, logged) =
            logs_at_default_level(|| NagiosClassifier.classify(&snap, &spec("zk_avg_latency", 5, 10)));
        assert_eq!(verdict.status, Status::Critical);
        assert_eq!(logged, "");

        let (verdict, logged) =
            logs_at_default_level(|| NagiosClassifier.classify(&snap, &spec("zk_avg_latency", 5, 20)));
        assert_eq!(verdict.status, Status::Warning);
        assert_eq!(logged, "");

        let (verdict, logged) =
            logs_at_default_level(|| NagiosClassifier.classify(&snap, &spec("zk_nope", 5, 10)));
        assert_eq!(verdict.status, Status::Critical);
        assert_eq!(logged, "");
    }
}
