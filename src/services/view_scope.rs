//! Lifetime guard for mounted views.
//!
//! A view hands a clone of its scope to every request it starts. When the
//! view is torn down the scope is closed, and results that arrive later are
//! dropped instead of being applied to state nobody displays anymore.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ViewScope {
    live: Arc<AtomicBool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Tear the view down. Every clone observes the change.
    pub fn close(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Run `apply` only while the view is live. Returns whether it ran.
    pub fn apply<F: FnOnce()>(&self, what: &str, apply: F) -> bool {
        if self.is_live() {
            apply();
            true
        } else {
            log::debug!("Dropping late {} for a closed view", what);
            false
        }
    }
}
