#![warn(missing_docs)]
//! Deterministic testing surfaces: JSONL event stream, JSON reports and
//! terrain region fingerprints.

mod region;

use anyhow::Result;
use digsite_core::SimTick;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub use region::*;

/// Primary event record captured by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Short kind label (`command`, `chunks`, ...).
    pub kind: &'a str,
    /// Free-form payload.
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    out: BufWriter<File>,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "event log opened");
        Ok(Self {
            out: BufWriter::new(File::create(path)?),
        })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Flush buffered events to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Persist any serializable report as pretty JSON, creating parent dirs.
pub fn write_json_report<P: AsRef<Path>, T: Serialize>(path: P, report: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "{name}-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_event() {
        let path = temp_path("events.jsonl");
        let mut sink = JsonlSink::create(&path).expect("sink create");
        for (tick, kind) in [(0, "command"), (3, "chunks")] {
            sink.write(&EventRecord {
                tick: SimTick(tick),
                kind,
                payload: "ok",
            })
            .expect("write succeeds");
        }
        sink.flush().expect("flush");
        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"chunks\""));
        assert!(lines[1].contains("\"tick\":3"));
    }

    #[test]
    fn json_report_is_pretty() {
        let path = temp_path("report.json");
        let histogram = BlockHistogram::from_blocks([
            digsite_core::BlockType::Dirt,
            digsite_core::BlockType::Dirt,
        ]);
        write_json_report(&path, &histogram).expect("report written");
        let contents = fs::read_to_string(&path).expect("file readable");
        assert!(contents.contains("\"dirt\": 2"));
    }
}
