//! Cooperative cancellation
//!
//! The flag is set from outside (signal handler, another thread, a
//! supervising task) and polled by the engine between input bytes.
//! The engine never sets it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag, cheap to clone
#[derive(Clone, Debug, Default)]
pub struct AbortFlag {
    requested: Arc<AtomicBool>,
}

impl AbortFlag {
    /// Create a flag that is not set
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every pass polling this flag
    pub fn abort(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested
    pub fn is_aborted(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Clear a previous request so the flag can be reused
    pub fn reset(&self) {
        self.requested.store(false, Ordering::Release);
    }
}
