//! Operation-scoped loading flags

use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct FlagState {
    /// Bumped by `reset`; guards from an older epoch no longer count
    epoch: u64,
    active: usize,
}

/// A loading indicator shared between a store and its readers
///
/// Raised by [`LoadingFlag::raise`] and lowered when the returned guard drops,
/// on every exit path including errors and cancelled futures. Overlapping
/// operations are counted so the flag stays up until the last one finishes.
/// A guard raised before a [`reset`](LoadingFlag::reset) never lowers the
/// flag for operations started after it.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag {
    state: Arc<Mutex<FlagState>>,
}

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.with(|s| s.active > 0)
    }

    /// Mark an operation as started; it ends when the guard drops
    #[must_use = "the flag is lowered as soon as the guard is dropped"]
    pub fn raise(&self) -> LoadingGuard {
        let epoch = self.with(|s| {
            s.active += 1;
            s.epoch
        });
        LoadingGuard {
            flag: self.clone(),
            epoch,
        }
    }

    /// Force the flag down and disown every running operation
    pub fn reset(&self) {
        self.with(|s| {
            s.epoch += 1;
            s.active = 0;
        });
    }

    fn with<R>(&self, f: impl FnOnce(&mut FlagState) -> R) -> R {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Keeps its [`LoadingFlag`] raised while alive
#[derive(Debug)]
pub struct LoadingGuard {
    flag: LoadingFlag,
    epoch: u64,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let epoch = self.epoch;
        self.flag.with(|s| {
            if s.epoch == epoch {
                s.active = s.active.saturating_sub(1);
            }
        });
    }
}
