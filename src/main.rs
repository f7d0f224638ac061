//! digsite - deterministic chunked mine world
//!
//! Headless driver: loads the world config, streams chunks at a fixed tick
//! rate and replays a command script against the world.

mod command_script;
mod commands;
mod config;
mod headless;

use anyhow::Result;
use clap::Parser;
use config::GameConfig;
use headless::HeadlessConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "digsite", version, about = "Run the mine world headless")]
struct Cli {
    /// World config (TOML), `config/world.toml` when omitted. Missing or
    /// invalid files fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the world seed from the config.
    #[arg(long)]
    seed: Option<String>,
    /// JSON command script to replay.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Number of ticks to simulate (defaults to `max_ticks` from the config).
    #[arg(long)]
    ticks: Option<u64>,
    /// Stop as soon as the script has no steps left.
    #[arg(long)]
    exit_when_script_finished: bool,
    /// Write a JSONL event log here.
    #[arg(long)]
    events: Option<PathBuf>,
    /// Write the effective config to this path and exit.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // WARN by default; override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting digsite v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut game = match cli.config.as_deref() {
        Some(path) => GameConfig::load_from_path(path),
        None => GameConfig::load(),
    };
    if let Some(seed) = cli.seed {
        game.world.seed = Some(seed);
    }

    if let Some(path) = cli.save_config {
        game.save_to_path(&path)?;
        println!("Wrote config to {}", path.display());
        return Ok(());
    }

    let summary = headless::run(HeadlessConfig {
        world: game.world,
        command_script: cli.script,
        max_ticks: cli.ticks.unwrap_or(game.max_ticks),
        exit_when_script_finished: cli.exit_when_script_finished,
        events: cli.events,
    })?;
    println!(
        "ticks={} commands={} chunks_loaded={} chunks_unloaded={}",
        summary.ticks, summary.commands, summary.chunks_loaded, summary.chunks_unloaded
    );
    Ok(())
}
