//! Cooperative cancellation for render tasks.
//!
//! The external renderer and the pump loop check the token between units of
//! work and stop early once it is cancelled. Cancellation of an in-flight
//! render is therefore best-effort; a render that cannot stop is allowed to
//! finish and its result discarded by the caller.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared cancellation flag for one render task.
///
/// Clones observe the same underlying state, so the queue can keep one clone
/// while handing another to the renderer.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the non-cancelled state.
    pub fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// Cancel this token and all of its clones. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether `cancel()` has been called on this token or any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
