//! Cooperative cancellation flag shared with worker threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag telling workers to stop picking up new files.
///
/// Normal runs never cancel; the pipeline only trips it when enumeration
/// fails and the run is abandoned.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
