//! Platform implementations of the core's host capabilities.

mod clipboard;
mod event_bus;
mod opener;

pub use clipboard::PlatformClipboard;
pub use event_bus::ConsoleEventBus;
pub use opener::SystemUrlOpener;
