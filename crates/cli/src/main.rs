use breakwater::{logging, Commands, LegacyBackend};
use breakwater_config::SettingsLoader;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "breakwater")]
#[command(about = "Exercise retry and circuit-breaker policies against a flaky backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $BREAKWATER_CONFIG, then built-in values)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    logging::init().map_err(|e| eyre::eyre!("failed to initialize logging: {e}"))?;

    let cli = Cli::parse();

    let mut loader = SettingsLoader::new();
    if let Some(path) = cli.config {
        loader = loader.path(path);
    }
    let settings = loader.load()?;
    tracing::debug!(?settings, "loaded settings");

    let summary = cli
        .command
        .execute(&settings, Arc::new(LegacyBackend::new()))
        .await?;

    for report in &summary.reports {
        println!("request {}: {report}", report.request);
    }
    for transition in &summary.transitions {
        println!("circuit {transition}");
    }

    tracing::info!(
        requests = summary.reports.len(),
        succeeded = summary.succeeded(),
        backend_requests = summary.backend_requests,
        "run complete"
    );
    Ok(())
}
