//! Progress reporting and cooperative cancellation
//!
//! Long-running operations (composition, protocol search) poll
//! [`ProgressObserver::is_cancelled`] once per frontier iteration or per
//! evaluated protocol and abort with `SynthesisError::Cancelled`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Observer injected into engine operations
pub trait ProgressObserver: Send + Sync {
    /// Polled by the engine; returning true aborts the operation
    fn is_cancelled(&self) -> bool {
        false
    }

    /// Called with the number of completed and total work items
    fn on_progress(&self, _completed: u64, _total: u64) {}
}

/// Observer that never cancels and ignores progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Shared cancellation flag
///
/// Clones share the same flag, so one handle can be given to the engine
/// while another is kept by the caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl ProgressObserver for CancellationFlag {
    fn is_cancelled(&self) -> bool {
        self.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_never_cancels() {
        assert!(!NoopObserver.is_cancelled());
    }

    #[test]
    fn test_cancellation_flag_shared_between_clones() {
        let flag = CancellationFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_cancelled());

        handle.cancel();
        assert!(flag.is_cancelled());
    }
}
