//! Single-flight guard for job starts.

use std::sync::atomic::{AtomicBool, Ordering};

/// Rejects a second job while one is active.
///
/// There is no queue: a failed [`try_acquire`](Self::try_acquire) is reported
/// to the caller and never retried here.
#[derive(Debug, Default)]
pub struct BusyGate {
    busy: AtomicBool,
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag if it is clear. Returns `false` when already busy.
    pub fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
