#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use index_reconcile::cluster::HttpCluster;
use index_reconcile::monitor::{DeliveryMode, deliver_report, notify_failure};
use index_reconcile::report::{ReportFormat, ReportFormatter};
use index_reconcile::source::{YamlFixtureSource, discover_fixtures};
use index_reconcile::{MonitorConfig, ReconcileResult, run_monitor};

#[derive(Parser)]
#[command(name = "index-reconcile")]
#[command(about = "Compare fixture-declared index and alias names against a live search cluster")]
struct Cli {
    /// Directory searched recursively for `*.y*ml` fixture files.
    fixtures_dir: PathBuf,
    /// Print the report instead of mailing it.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Rendering used for dry runs; mail is always HTML.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info,index_reconcile=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .init();
}

fn execute(cli: &Cli, config: &MonitorConfig, mode: DeliveryMode) -> ReconcileResult<()> {
    let paths = discover_fixtures(&cli.fixtures_dir)?;
    let cluster = HttpCluster::new(config.es_url.as_str())?;
    let report = run_monitor(config, &paths, &YamlFixtureSource, &cluster)?;

    if mode == DeliveryMode::Mail {
        tracing::info!(recipients = %config.recipients.join(","), "sending report");
    }
    let formatter = ReportFormatter::new(&config.branch);
    deliver_report(&report, &formatter, mode.format(), mode.sink(config).as_ref())?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mode = match DeliveryMode::resolve(cli.dry_run, cli.format, &config) {
        Ok(mode) => mode,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match execute(&cli, &config, mode) {
        Ok(()) => {
            tracing::info!("finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(kind = ?err.kind(), "{err}");
            if mode == DeliveryMode::Mail {
                let formatter = ReportFormatter::new(&config.branch);
                if let Err(e) = notify_failure(&err, &formatter, mode.sink(&config).as_ref()) {
                    tracing::warn!("error notification not delivered: {e}");
                }
            }
            ExitCode::FAILURE
        }
    }
}
