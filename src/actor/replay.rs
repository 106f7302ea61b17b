//! Recording and replaying the event stream.
//!
//! A recording is a plain text file: the first line is the configuration the
//! engine started with, every following line is one event, all in RON. Replay
//! rebuilds a switchboard from the recorded configuration and feeds it the
//! events synchronously, which reproduces any state the original run reached.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, bail};
use tracing::{info, warn};

use crate::actor::switchboard::{Collaborators, Event, Switchboard};
use crate::common::config::Config;

pub struct Record {
    out: Option<BufWriter<File>>,
}

impl Record {
    pub fn disabled() -> Self {
        Self { out: None }
    }

    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("creating recording at {}", path.display()))?;
        info!(path = %path.display(), "recording event stream");
        Ok(Self { out: Some(BufWriter::new(file)) })
    }

    /// Writes the header line. Called once, before any event.
    pub fn start(&mut self, config: &Config) {
        let Some(out) = &mut self.out else { return };
        match ron::to_string(config) {
            Ok(line) => {
                if writeln!(out, "{line}").and_then(|()| out.flush()).is_err() {
                    warn!("recording header write failed; disabling recording");
                    self.out = None;
                }
            }
            Err(err) => {
                warn!(%err, "could not serialize config; disabling recording");
                self.out = None;
            }
        }
    }

    pub fn on_event(&mut self, event: &Event) {
        let Some(out) = &mut self.out else { return };
        match ron::to_string(event) {
            Ok(line) => {
                if writeln!(out, "{line}").and_then(|()| out.flush()).is_err() {
                    warn!("recording write failed; disabling recording");
                    self.out = None;
                }
            }
            Err(err) => warn!(%err, "could not serialize event; skipping"),
        }
    }
}

/// Replays a recording against fresh collaborators. Returns the switchboard
/// in its final state so the caller can inspect it or keep running.
pub fn replay(path: &Path, deps: Collaborators) -> anyhow::Result<Switchboard> {
    let file =
        File::open(path).with_context(|| format!("opening recording at {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let Some(header) = lines.next() else {
        bail!("recording at {} is empty", path.display());
    };
    let config: Config = ron::from_str(&header?).context("parsing recorded config")?;
    let mut board = Switchboard::new(config, deps, Record::disabled());
    let mut applied = 0usize;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event =
            ron::from_str(&line).with_context(|| format!("parsing recorded event: {line}"))?;
        board.handle_event(event);
        applied += 1;
    }
    info!(applied, "replay finished");
    Ok(board)
}
