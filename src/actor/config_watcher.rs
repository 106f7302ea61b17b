//! Watches the config file and feeds parsed updates to the switchboard.
//!
//! The watch is on the parent directories rather than the file itself so
//! atomic-rename saves (the common editor behavior) are still seen. Events
//! are debounced and then matched back to the config file by path, by
//! canonicalized path, and by device/inode, since editors differ in which of
//! those survives a save.

use std::collections::HashSet;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;
use std::time::Duration;
use std::{fs, thread};

use notify::RecursiveMode;
use notify_debouncer_mini::{
    DebounceEventResult, DebouncedEvent, DebouncedEventKind, new_debouncer,
};
use tracing::{info, trace, warn};

use crate::actor;
use crate::actor::switchboard::Event;
use crate::common::config::Config;

const DEBOUNCE: Duration = Duration::from_millis(250);

pub struct ConfigWatcher {
    file: PathBuf,
    real_file: Option<PathBuf>,
    real_file_id: Option<(u64, u64)>,
    events_tx: actor::Sender<Event>,
    enabled: bool,
}

impl ConfigWatcher {
    pub fn spawn(events_tx: actor::Sender<Event>, config: &Config, config_path: PathBuf) {
        let enabled = config.settings.hot_reload;
        thread::Builder::new()
            .name("config-watcher".to_string())
            .spawn(move || {
                let real_file = fs::canonicalize(&config_path).ok();
                let real_file_id = real_file
                    .as_ref()
                    .and_then(|p| fs::metadata(p).ok())
                    .map(|m| (m.dev(), m.ino()));
                let watcher = ConfigWatcher {
                    file: config_path,
                    real_file,
                    real_file_id,
                    events_tx,
                    enabled,
                };
                let rt = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .expect("building config-watcher runtime");
                rt.block_on(async move {
                    if let Err(e) = watcher.run().await {
                        warn!("config-watcher error: {e:?}");
                    }
                });
            })
            .expect("failed to spawn config-watcher thread");
    }

    async fn run(mut self) -> notify::Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<DebouncedEvent>();

        let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for e in events {
                    if e.kind == DebouncedEventKind::Any {
                        let _ = tx.send(e);
                    }
                }
            }
        })?;
        let watcher = debouncer.watcher();

        let mut parents: HashSet<PathBuf> = HashSet::new();
        if let Some(p) = self.file.parent() {
            parents.insert(p.to_path_buf());
        }
        if let Some(real) = &self.real_file
            && let Some(p) = real.parent()
        {
            parents.insert(p.to_path_buf());
        }
        for dir in parents.iter() {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            info!("watching {:?}", dir);
        }

        while let Some(event) = rx.recv().await {
            if !self.is_relevant(&event) {
                continue;
            }
            trace!("change detected (debounced): {:?} {:?}", event.kind, event.path);
            let config = match Config::read(&self.file) {
                Ok(config) => config,
                Err(e) => {
                    warn!("ignoring unreadable config change: {e:?}");
                    continue;
                }
            };
            // A disabled watcher still reads the file, so turning hot_reload
            // back on takes effect without a restart.
            if !self.enabled && !config.settings.hot_reload {
                trace!("hot reload disabled; ignoring change");
                continue;
            }
            self.enabled = config.settings.hot_reload;
            self.events_tx.send(Event::ConfigUpdated(Box::new(config)));
        }

        Ok(())
    }

    fn is_relevant(&self, event: &DebouncedEvent) -> bool {
        if event.path == self.file {
            return true;
        }

        if let Some(real) = &self.real_file {
            if event.path == *real {
                return true;
            }

            if let Ok(ev_real) = fs::canonicalize(&event.path)
                && ev_real == *real
            {
                return true;
            }

            if let Ok(meta) = fs::metadata(&event.path)
                && let Some((dev, ino)) = self.real_file_id
                && meta.dev() == dev
                && meta.ino() == ino
            {
                return true;
            }
        }

        event.path.file_name().is_some_and(|n| Some(n) == self.file.file_name())
    }
}
