//! Shared event contracts for the support screen.
//!
//! These DTOs are what the core publishes and what a renderer consumes.
//! Keeping them in one crate prevents the two sides from disagreeing on
//! field names.

mod bus;

pub use bus::{EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use serde::{Deserialize, Serialize};

/// Emitted after every overlay transition.
///
/// Producers: overlay coordinator
/// Consumers: presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayChangedEvent {
    /// Fresh per emission, so two identical overlays in a row are distinguishable.
    pub key: String,
    /// Overlay variant in snake_case ("none", "email_choice", ...).
    pub overlay: String,
    /// Destination for a presented blog page.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Offered actions in display order.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Milliseconds since epoch.
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl OverlayChangedEvent {
    /// New event with a random key and the current time.
    pub fn new(overlay: impl Into<String>) -> Self {
        Self {
            key: uuid::Uuid::new_v4().to_string(),
            overlay: overlay.into(),
            url: None,
            title: None,
            message: None,
            actions: Vec::new(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Short spoken/visible confirmation (e.g. after a clipboard write).
///
/// Producers: overlay coordinator
/// Consumers: presentation layer (accessibility announcement)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementEvent {
    pub message: String,
}

/// Emitted when the reserved header height changes.
///
/// Producers: host (from the header tracker)
/// Consumers: presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaderReservedEvent {
    pub reserved_height: f64,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Overlay changed event.
    pub const OVERLAY_CHANGED: &str = "overlay:changed";
    /// Announcement event.
    pub const ANNOUNCEMENT: &str = "support:announcement";
    /// Header reservation event.
    pub const HEADER_RESERVED: &str = "layout:header_reserved";
}
