//! # Cooperative stop signalling
//!
//! A `StopSignal` is the only mutable state shared across harness tasks.
//! It is write-once-sticky: once triggered it never resets, and the owning
//! loop is expected to observe it within one polling interval and unwind.
//!
//! ## Expectations:
//! - Lock-free, clonable handle
//! - Single writer per flag (controller or the owning loop's error path)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A sticky, clonable cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates a new signal in the untriggered state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Idempotent; the flag never resets.
    #[inline]
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true once a stop has been requested.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
