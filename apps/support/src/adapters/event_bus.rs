//! Event bus that renders events on the terminal.

use conquest_events::{
    event_names, AnnouncementEvent, EventBus, HeaderReservedEvent, OverlayChangedEvent,
};
use tracing::{debug, warn};

/// Prints each event as a line of text, standing in for a real renderer.
#[derive(Debug, Default)]
pub struct ConsoleEventBus;

impl ConsoleEventBus {
    pub fn new() -> Self {
        Self
    }
}

impl EventBus for ConsoleEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        debug!(topic, %payload, "event");
        match render(topic, payload) {
            Some(line) => println!("{line}"),
            None => warn!(topic, "Unrenderable event"),
        }
    }
}

/// One-line rendering of an event, or `None` for unknown topics and
/// payloads that do not match their topic.
pub(crate) fn render(topic: &str, payload: serde_json::Value) -> Option<String> {
    match topic {
        event_names::OVERLAY_CHANGED => {
            let event: OverlayChangedEvent = serde_json::from_value(payload).ok()?;
            Some(render_overlay(&event))
        }
        event_names::ANNOUNCEMENT => {
            let event: AnnouncementEvent = serde_json::from_value(payload).ok()?;
            Some(format!("(announce) {}", event.message))
        }
        event_names::HEADER_RESERVED => {
            let event: HeaderReservedEvent = serde_json::from_value(payload).ok()?;
            Some(format!("(layout) header reserved: {}", event.reserved_height))
        }
        _ => None,
    }
}

fn render_overlay(event: &OverlayChangedEvent) -> String {
    if event.overlay == "none" {
        return "[overlay closed]".to_string();
    }

    let mut line = format!("[{}]", event.overlay);
    if let Some(title) = &event.title {
        line.push(' ');
        line.push_str(title);
        line.push(':');
    }
    if let Some(message) = &event.message {
        line.push(' ');
        line.push_str(message);
    }
    if !event.actions.is_empty() {
        line.push_str(&format!(" <{}>", event.actions.join(" | ")));
    }
    line
}
