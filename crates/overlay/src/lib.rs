//! Overlay coordination for the support contact screen.
//!
//! The screen can show at most one overlay at a time: an "unavailable"
//! alert, the email choice dialog, the copied confirmation, or the blog
//! viewer. [`OverlayCoordinator`] owns that single slot, starts handoffs
//! through [`conquest_handoff::IntentDispatcher`], and applies their
//! outcomes when they arrive.
//!
//! # Architecture
//!
//! ```text
//! user gesture ──► OverlayCoordinator ──► IntentDispatcher ──► UrlOpener (host)
//!                        ▲    │                                     │
//!                        │    └──► ClipboardWriter (host)           │
//!                        └──────────── outcome (async) ◄────────────┘
//!                        │
//!                        └──► EventBus: overlay:changed, support:announcement
//! ```

mod clipboard;
mod coordinator;
mod error;
mod state;
mod timer;

pub use clipboard::{ClipboardWriter, ClipboardWriterRef, InMemoryClipboard};
pub use coordinator::{DispatchTicket, OverlayCoordinator, OverlaySettings, DEFAULT_COPIED_DISPLAY};
pub use error::{OverlayError, Result};
pub use state::{
    OverlayAction, OverlayPresentation, OverlayState, EMAIL_COPIED_MESSAGE, NUMBER_COPIED_MESSAGE,
};
pub use timer::DelayedAction;
