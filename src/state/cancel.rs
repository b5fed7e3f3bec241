use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop flag shared between a session and its crawl task
///
/// Setting it is idempotent. The crawl engine only reads it, at page
/// boundaries; it never interrupts a fetch that is already in flight.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    flag: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the crawl to stop
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Re-arms the signal for a new run
    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}
