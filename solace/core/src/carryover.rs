//! Carryover Input Staging
//!
//! A quick-start prompt can be staged by another part of the page (e.g. a
//! "talk about exam stress" card) before the conversation view loads. The
//! Controller consumes the staged value exactly once at startup; taking it
//! clears the slot under the lock so the value cannot be replayed on a
//! reload.

use std::sync::Arc;

use parking_lot::Mutex;

/// Process-scoped staging slot for one carryover message
#[derive(Clone, Debug, Default)]
pub struct CarryoverSlot {
    inner: Arc<Mutex<Option<String>>>,
}

impl CarryoverSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a value, replacing any previous one
    pub fn stage(&self, text: impl Into<String>) {
        *self.inner.lock() = Some(text.into());
    }

    /// Consume the staged value, clearing the slot
    pub fn take(&self) -> Option<String> {
        self.inner.lock().take()
    }

    /// Whether a value is currently staged
    pub fn is_staged(&self) -> bool {
        self.inner.lock().is_some()
    }
}
