//! swarm-monitor binary: one monitoring pass, then exit.
//!
//! Meant to be triggered by cron or a CI schedule.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use swarm_monitor::{Monitor, MonitorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "swarm-monitor", version, about = "Mining pool worker-liveness monitor")]
struct Cli {
    /// TOML config file (defaults to $SWARM_MONITOR_CONFIG or the OS config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch and classify only, send nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env optionnel
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swarm_monitor=info")),
        )
        .init();

    let cli = Cli::parse();
    info!("swarm-monitor {} starting", env!("CARGO_PKG_VERSION"));

    let config = MonitorConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let monitor = Monitor::from_config(config)
        .context("Failed to create monitor")?
        .dry_run(cli.dry_run);

    let summary = monitor.run_once().await.context("Monitoring run failed")?;
    info!(
        "Run complete: {} offline, {} online, alert={}, emailed={}, webhook={}",
        summary.classification.offline_count(),
        summary.classification.active_count(),
        summary.decision.fires(),
        summary.emailed,
        summary.webhook_posted
    );

    Ok(())
}
