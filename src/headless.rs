use crate::command_script::CommandScriptPlayer;
use crate::commands::{execute_command, parse_command, CommandSession};
use anyhow::{Context, Result};
use digsite_core::SimTick;
use digsite_testkit::{EventRecord, JsonlSink};
use digsite_world::{ChunkLoadReport, World, WorldConfig};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct HeadlessConfig {
    pub world: WorldConfig,
    pub command_script: Option<PathBuf>,
    pub max_ticks: u64,
    pub exit_when_script_finished: bool,
    pub events: Option<PathBuf>,
}

/// What a headless run did, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeadlessSummary {
    pub ticks: u64,
    pub commands: usize,
    pub chunks_loaded: usize,
    pub chunks_unloaded: usize,
}

pub fn run(cfg: HeadlessConfig) -> Result<HeadlessSummary> {
    let mut script = cfg
        .command_script
        .as_deref()
        .map(CommandScriptPlayer::from_path)
        .transpose()?;
    let mut sink = cfg
        .events
        .as_ref()
        .map(|path| {
            JsonlSink::create(path).with_context(|| format!("creating event log {}", path.display()))
        })
        .transpose()?;

    let world = World::new(cfg.world);
    info!(seed = world.seed(), "headless world ready");
    let mut session = CommandSession::new(world);
    let mut summary = HeadlessSummary {
        chunks_loaded: session.world.loaded_chunks().len(),
        ..HeadlessSummary::default()
    };

    let mut tick = SimTick::ZERO;
    while tick.0 < cfg.max_ticks {
        if let Some(script) = script.as_mut() {
            for line in script.drain_ready_commands(tick) {
                summary.commands += 1;
                let lines = match parse_command(&line) {
                    Ok(command) => execute_command(&mut session, command).lines,
                    Err(err) => vec![format!("Error: {err}")],
                };
                for out in &lines {
                    debug!(tick = tick.0, command = %line, "{out}");
                }
                if let Some(sink) = sink.as_mut() {
                    let payload = format!("{line} => {}", lines.join("; "));
                    sink.write(&EventRecord {
                        tick,
                        kind: "command",
                        payload: &payload,
                    })?;
                }
            }
        }

        let report = session.world.update(tick.as_millis(), SimTick::MILLIS);
        if !report.is_empty() {
            summary.chunks_loaded += report.loaded.len();
            summary.chunks_unloaded += report.unloaded.len();
            if let Some(sink) = sink.as_mut() {
                let payload = describe_report(&report);
                sink.write(&EventRecord {
                    tick,
                    kind: "chunks",
                    payload: &payload,
                })?;
            }
        }

        tick = tick.advance(1);
        if cfg.exit_when_script_finished && script.as_ref().is_some_and(|s| s.is_finished()) {
            break;
        }
    }

    if let Some(last) = script.as_ref().and_then(|s| s.last_tick()) {
        warn!(
            ticks = cfg.max_ticks,
            last_step = last.0,
            "tick limit reached before the command script finished"
        );
    }
    if let Some(sink) = sink.as_mut() {
        sink.flush()?;
    }

    summary.ticks = tick.0;
    info!(
        ticks = summary.ticks,
        commands = summary.commands,
        loaded = summary.chunks_loaded,
        unloaded = summary.chunks_unloaded,
        "headless run finished"
    );
    Ok(summary)
}

fn describe_report(report: &ChunkLoadReport) -> String {
    let join = |chunks: &[digsite_world::ChunkPos]| {
        chunks
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!(
        "loaded [{}] unloaded [{}]",
        join(&report.loaded),
        join(&report.unloaded)
    )
}
