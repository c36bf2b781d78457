//! Monotonic frame counter used for audit filenames

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static PROCESS_COUNTER: Lazy<Arc<FrameCounter>> = Lazy::new(|| Arc::new(FrameCounter::new()));

/// Atomic counter; every call to [`FrameCounter::next`] yields a fresh value
#[derive(Debug, Default)]
pub struct FrameCounter {
    value: AtomicU64,
}

impl FrameCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Counter whose next value is `start + 1`
    #[must_use]
    pub fn starting_at(start: u64) -> Self {
        Self {
            value: AtomicU64::new(start),
        }
    }

    /// The counter shared by every recorder in this process
    #[must_use]
    pub fn process_wide() -> Arc<FrameCounter> {
        Arc::clone(&PROCESS_COUNTER)
    }

    /// Increment and return the new value
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last value handed out (0 before the first call)
    #[must_use]
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}
