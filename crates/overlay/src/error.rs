//! Error types for the overlay coordinator.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// Writing to the system clipboard failed.
    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    /// The coordinator was built outside a Tokio runtime.
    #[error("overlay coordinator requires a Tokio runtime")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, OverlayError>;
