use anyhow::{Context, Result};
use digsite_core::SimTick;
use serde::Deserialize;
use std::{collections::VecDeque, fs, path::Path};

#[derive(Debug, Deserialize)]
struct ScriptFile {
    steps: Vec<ScriptStepDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScriptStepDef {
    tick: u64,
    command: String,
}

#[derive(Debug, Clone)]
struct ScriptStep {
    tick: SimTick,
    command: String,
}

/// Replays world commands at fixed ticks.
///
/// A script is a list of `{tick, command}` steps sorted by tick. Steps that
/// share a tick run in file order.
#[derive(Debug)]
pub struct CommandScriptPlayer {
    pending: VecDeque<ScriptStep>,
}

impl CommandScriptPlayer {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading command script {}", path.display()))?;
        Self::from_str(&contents)
    }

    pub fn from_str(contents: &str) -> Result<Self> {
        let file: ScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("command script contains no steps");
        }

        let mut pending = VecDeque::with_capacity(file.steps.len());
        let mut last_tick = 0u64;
        for step in file.steps {
            let command = step.command.trim().to_string();
            if command.is_empty() {
                anyhow::bail!("command script contains an empty command");
            }
            if step.tick < last_tick {
                anyhow::bail!(
                    "command script steps must be sorted by tick ({} after {last_tick})",
                    step.tick
                );
            }
            last_tick = step.tick;
            pending.push_back(ScriptStep {
                tick: SimTick(step.tick),
                command,
            });
        }

        Ok(Self { pending })
    }

    /// Drain every command scheduled at or before `tick`.
    pub fn drain_ready_commands(&mut self, tick: SimTick) -> Vec<String> {
        let ready = self
            .pending
            .iter()
            .take_while(|step| step.tick <= tick)
            .count();
        self.pending.drain(..ready).map(|step| step.command).collect()
    }

    /// Tick of the last step, used to size a run that has no tick limit.
    pub fn last_tick(&self) -> Option<SimTick> {
        self.pending.back().map(|step| step.tick)
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}
