//! Zone directory watching for re-checks.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, warn};

/// Watches zone directories recursively.
pub struct ZoneWatcher {
    watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
}

impl ZoneWatcher {
    /// Creates a new zone watcher.
    pub fn new() -> notify::Result<Self> {
        let (tx, rx) = channel();

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        Ok(Self {
            watcher,
            receiver: rx,
        })
    }

    /// Starts watching a directory and everything below it.
    pub fn watch(&mut self, dir: impl AsRef<Path>) -> notify::Result<()> {
        self.watcher.watch(dir.as_ref(), RecursiveMode::Recursive)
    }

    /// Stops watching a directory.
    pub fn unwatch(&mut self, dir: impl AsRef<Path>) -> notify::Result<()> {
        self.watcher.unwatch(dir.as_ref())
    }

    /// Checks for changes without blocking. Returns the changed paths, or
    /// `None` if nothing relevant happened.
    pub fn poll(&self) -> Option<Vec<PathBuf>> {
        let mut changed = Vec::new();
        while let Ok(res) = self.receiver.try_recv() {
            collect(res, &mut changed);
        }
        (!changed.is_empty()).then_some(changed)
    }

    /// Blocks until something changes, then waits until no further events
    /// arrive for `debounce`. Returns every path touched in that burst, or
    /// `None` once the watcher has shut down.
    pub fn wait(&self, debounce: Duration) -> Option<Vec<PathBuf>> {
        let mut changed = Vec::new();
        while changed.is_empty() {
            let res = self.receiver.recv().ok()?;
            collect(res, &mut changed);
        }

        loop {
            match self.receiver.recv_timeout(debounce) {
                Ok(res) => collect(res, &mut changed),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }

        changed.sort();
        changed.dedup();
        debug!(paths = changed.len(), "zone files changed");
        Some(changed)
    }
}

/// Adds the paths of content-changing events to `changed`.
fn collect(res: notify::Result<Event>, changed: &mut Vec<PathBuf>) {
    match res {
        Ok(event) if is_relevant(&event) => changed.extend(event.paths),
        Ok(_) => {}
        Err(err) => warn!(error = %err, "watch error"),
    }
}

fn is_relevant(event: &Event) -> bool {
    event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()
}
