//! Clipboard capability.
//!
//! The coordinator only ever writes plain text; the host supplies the
//! platform implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{OverlayError, Result};

/// Host capability for writing text to the system clipboard.
///
/// Called synchronously from the coordinator, possibly on a runtime worker,
/// though never with its state lock held. Implementations must return
/// promptly and must not block on user interaction; a backend that needs
/// to keep serving the selection should do so from its own thread.
pub trait ClipboardWriter: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}

/// Shared clipboard reference.
pub type ClipboardWriterRef = Arc<dyn ClipboardWriter>;

/// Clipboard that keeps writes in memory.
///
/// Used by tests and by headless hosts without a display server.
#[derive(Default)]
pub struct InMemoryClipboard {
    writes: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl InMemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<String>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make subsequent writes fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Last text written, if any.
    pub fn contents(&self) -> Option<String> {
        self.guard().last().cloned()
    }

    /// Every successful write, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.guard().clone()
    }
}

impl ClipboardWriter for InMemoryClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(OverlayError::Clipboard("clipboard unavailable".to_string()));
        }
        self.guard().push(text.to_string());
        Ok(())
    }
}
