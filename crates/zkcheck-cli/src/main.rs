//! zkcheck: Nagios-style health check for a ZooKeeper ensemble.
//!
//! Queries every node's admin port (`mntr`, falling back to `stat`),
//! then either dumps the collected stats or classifies one metric
//! against warning/critical thresholds.
//!
//! # Usage
//!
//! ```text
//! zkcheck -s zk1:2181,zk2:2181,zk3:2181
//! zkcheck -s zk1:2181,zk2:2181 -o nagios -k zk_avg_latency -w 100 -c 500
//! zkcheck --config /etc/zkcheck.toml -o nagios
//! ```
//!
//! Exit codes: 0 OK, 1 WARNING (or unknown output profile), 2 CRITICAL.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{debug, info_span};
use tracing_subscriber::EnvFilter;

use zkcheck_core::{ConfigError, Status};
use zkcheck_health::{ClusterCollector, profile};

mod output;
mod settings;

use settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "zkcheck",
    about = "Check the health of a ZooKeeper ensemble",
    version
)]
struct Cli {
    /// Comma-separated list of servers (host:port).
    #[arg(short, long, value_name = "SERVERS")]
    servers: Option<String>,

    /// Output handler; omit to dump every node's stats.
    #[arg(short, long, value_name = "HANDLER")]
    output: Option<String>,

    /// Metric to check, e.g. zk_avg_latency.
    #[arg(short, long)]
    key: Option<String>,

    /// Warning threshold.
    #[arg(short, long, allow_hyphen_values = true)]
    warning: Option<String>,

    /// Critical threshold.
    #[arg(short, long, allow_hyphen_values = true)]
    critical: Option<String>,

    /// Per-probe timeout ("500ms", "2s", or seconds).
    #[arg(short, long)]
    timeout: Option<String>,

    /// Maximum number of nodes probed at once.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Read defaults from a zkcheck.toml file; flags take precedence.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stats dump format (only used without --output).
    #[arg(short, long, value_enum, default_value = "text")]
    format: DumpFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    Text,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Scoped to this invocation; dropped when main returns.
    let _log_guard = init_logging(cli.verbose, cli.log_json);

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            println!("{}", fatal_line(&e));
            ExitCode::from(fatal_exit_code(&e))
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<u8> {
    let settings = Settings::resolve(cli)?;

    let classifier = match &settings.output {
        Some(name) => Some(profile::lookup(name)?),
        None => None,
    };
    let threshold = match classifier {
        Some(_) => Some(settings.threshold()?),
        None => None,
    };

    let span = info_span!(
        "zkcheck",
        servers = settings.endpoints.len(),
        output = settings.output.as_deref().unwrap_or("dump"),
    );
    debug!(parent: &span, endpoints = ?settings.endpoints, "actual list of servers");

    let collector = ClusterCollector::new(settings.timeout, settings.concurrency).with_span(span.clone());
    let snapshot = collector.collect(&settings.endpoints).await;

    let (Some(classifier), Some(threshold)) = (classifier, threshold) else {
        let rendered = match cli.format {
            DumpFormat::Text => output::render_text(&snapshot),
            DumpFormat::Json => output::render_json(&snapshot)?,
        };
        print!("{rendered}");
        return Ok(Status::Ok.exit_code());
    };

    let verdict = span.in_scope(|| classifier.classify(&snapshot, &threshold));
    println!("{}", verdict.detail);
    Ok(verdict.exit_code())
}

/// The single line printed for a fatal error.
fn fatal_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ConfigError>() {
        Some(e) if e.is_threshold_error() => format!("{} - {e}", Status::Critical),
        _ => format!("{err:#}"),
    }
}

fn fatal_exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::UnknownProfile { .. }) => 1,
        _ => Status::Critical.exit_code(),
    }
}

/// Install a stderr subscriber for the lifetime of the returned guard.
fn init_logging(verbose: u8, json: bool) -> tracing::dispatcher::DefaultGuard {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let dispatch = if json {
        tracing::Dispatch::new(builder.json().finish())
    } else {
        tracing::Dispatch::new(builder.finish())
    };
    tracing::dispatcher::set_default(&dispatch)
}
