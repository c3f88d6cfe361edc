//! Shared cancellation flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Write-once stop flag shared by the coordinator, every worker and any
/// external canceller (e.g. a Ctrl-C handler).
///
/// Goes from `false` to `true` at most once; further `cancel` calls are no-ops.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal(Arc<AtomicBool>);

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests every holder of this signal to stop.
    ///
    /// Returns `true` if this call performed the transition.
    pub fn cancel(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
