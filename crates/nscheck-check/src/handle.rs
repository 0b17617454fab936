//! Shared, reloadable checker.
//!
//! [`CheckerHandle`] holds the checker for the current zone data. Runs lock
//! the checker they loaded; reloads prepare a replacement first and swap it
//! in, so a run in progress finishes against the data it started with.

use std::sync::Arc;

use arc_swap::ArcSwap;
use nscheck_zone::RecordStore;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::checker::ConsistencyChecker;
use crate::report::CheckReport;
use crate::Result;

/// Thread-safe holder of the current [`ConsistencyChecker`].
pub struct CheckerHandle {
    current: ArcSwap<Mutex<ConsistencyChecker>>,
}

impl CheckerHandle {
    /// Creates a handle around an existing checker.
    pub fn new(checker: ConsistencyChecker) -> Self {
        Self {
            current: ArcSwap::from_pointee(Mutex::new(checker)),
        }
    }

    /// Creates a handle checking `store`.
    pub fn from_store(store: impl Into<Arc<RecordStore>>) -> Self {
        Self::new(ConsistencyChecker::new(store))
    }

    /// Returns the current checker.
    pub fn load(&self) -> Arc<Mutex<ConsistencyChecker>> {
        self.current.load_full()
    }

    /// Returns the store of the current checker.
    pub fn store(&self) -> Arc<RecordStore> {
        let current = self.load();
        let checker = current.lock();
        Arc::clone(checker.store())
    }

    /// Runs `f` with exclusive access to the current checker.
    pub fn with<T>(&self, f: impl FnOnce(&mut ConsistencyChecker) -> T) -> T {
        let current = self.load();
        let mut checker = current.lock();
        f(&mut checker)
    }

    /// Runs every check against the current checker.
    pub fn run_all(&self) -> Result<CheckReport> {
        self.with(ConsistencyChecker::run_all)
    }

    /// Replaces the current checker with one over `store`.
    ///
    /// The new checker is prepared before it becomes visible. If preparation
    /// fails the current checker stays in place and the error is returned.
    pub fn reload(&self, store: impl Into<Arc<RecordStore>>) -> Result<()> {
        let mut checker = ConsistencyChecker::new(store);
        if let Err(err) = checker.prepare() {
            warn!(error = %err, "reload rejected, keeping previous zone data");
            return Err(err);
        }
        info!(records = checker.store().len(), "checker reloaded");
        self.replace(checker);
        Ok(())
    }

    /// Swaps in `checker` as-is.
    pub fn replace(&self, checker: ConsistencyChecker) {
        self.current.store(Arc::new(Mutex::new(checker)));
    }
}

impl std::fmt::Debug for CheckerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerHandle").finish_non_exhaustive()
    }
}
