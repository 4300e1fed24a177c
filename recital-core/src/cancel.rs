//! Cooperative cancellation token.
//!
//! Continuations (the inter-sentence pause, recognition restart backoff)
//! capture a clone of the token that was live when they were scheduled and
//! check it before doing anything. Cancelling is one-way.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared cancel flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether `other` is a clone of this token (same underlying flag).
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}
