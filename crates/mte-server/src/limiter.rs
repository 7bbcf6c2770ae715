//! Concurrent session limiter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts live sessions and optionally caps them.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    /// None = unlimited.
    max: Option<usize>,
}

impl ConnectionLimiter {
    pub fn new(max: Option<usize>) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    /// Claim a slot. The slot is released when the returned guard drops, so
    /// it can move into the session task and follow it to completion.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionSlot> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if self.max.is_some_and(|max| current >= max) {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(ConnectionSlot {
                    limiter: Arc::clone(self),
                });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }
}

/// Held by a session for its lifetime.
pub struct ConnectionSlot {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
    }
}
