//! Daemon binary for furrow.

use clap::{Parser, Subcommand};
use furrow::{Engine, FurrowConfig, LogDriver, SystemClock};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Furrow: two-pump irrigation scheduling and actuation engine.
#[derive(Parser)]
#[command(name = "furrowd", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the scheduling daemon until Ctrl+C.
    Daemon,

    /// Run pump A then pump B once, back to back, and exit.
    Run {
        /// Seconds to hold pump A on.
        a_secs: u64,

        /// Seconds to hold pump B on.
        b_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing. Users can override with RUST_LOG=debug.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("furrow=info")),
        )
        .init();

    let cli = Cli::parse();

    // Load config: explicit flag, then the default path if present.
    let config = if let Some(ref path) = cli.config {
        FurrowConfig::from_file(path)?
    } else {
        let path = FurrowConfig::default_config_path();
        if path.is_file() {
            FurrowConfig::from_file(&path)?
        } else {
            FurrowConfig::default()
        }
    };

    match cli.command.unwrap_or(Command::Daemon) {
        Command::Daemon => run_daemon(config).await,
        Command::Run { a_secs, b_secs } => run_once(config, a_secs, b_secs).await,
    }
}

async fn run_daemon(config: FurrowConfig) -> anyhow::Result<()> {
    println!("furrowd v{}", env!("CARGO_PKG_VERSION"));

    let engine = Engine::start(&config, SystemClock, LogDriver);
    let handle = engine.handle();

    // Seeds trickle into the table one per evaluator tick.
    if !config.seeds.is_empty() {
        info!(seeds = config.seeds.len(), "seeding schedule");
    }
    for seed in &config.seeds {
        match seed.to_entry() {
            Ok(entry) => {
                if !handle.submit_entry(entry) {
                    warn!("schedule queue full, seed dropped");
                }
            }
            Err(e) => warn!(error = %e, "skipping invalid schedule seed"),
        }
    }

    println!("\nScheduling active. Press Ctrl+C to stop.\n");
    tokio::signal::ctrl_c().await?;
    info!("received Ctrl+C, shutting down...");

    match handle.schedule_snapshot().await {
        Ok(snapshot) => match serde_json::to_string(&snapshot) {
            Ok(json) => info!(schedule = %json, "final schedule table"),
            Err(e) => warn!(error = %e, "could not serialize schedule table"),
        },
        Err(e) => warn!(error = %e, "could not read schedule table"),
    }

    engine.shutdown().await;
    Ok(())
}

async fn run_once(config: FurrowConfig, a_secs: u64, b_secs: u64) -> anyhow::Result<()> {
    println!("Running pump A for {a_secs}s, then pump B for {b_secs}s.");

    let engine = Engine::start(&config, SystemClock, LogDriver);
    let handle = engine.handle();

    let (a_sent, b_sent) =
        handle.run_pumps(Duration::from_secs(a_secs), Duration::from_secs(b_secs))?;
    if !a_sent || !b_sent {
        warn!(pump_a = a_sent, pump_b = b_sent, "run queue full, request dropped");
    }

    // Wait out both holds plus the runner's poll gaps before stopping.
    let bound = 2 * config.runner.poll_interval_secs + a_secs + b_secs + 1;
    tokio::time::sleep(Duration::from_secs(bound)).await;

    engine.shutdown().await;
    Ok(())
}
