//! Non-reentrancy flag for submission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Allows at most one submission in flight.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<AtomicBool>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard. `None` while another permit is alive.
    pub fn try_acquire(&self) -> Option<SubmissionPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionPermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_held(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Held for the duration of one submission; released on drop
#[derive(Debug)]
pub struct SubmissionPermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
