//! Clipboard adapter for the copy fallbacks.
//!
//! Implements ClipboardWriter using arboard for cross-platform clipboard access.
//! On X11 and Wayland the owner of a selection has to keep serving it, and
//! dropping the arboard handle gives it up unless a clipboard manager takes
//! over. One handle therefore lives on a dedicated thread for the life of
//! the process, and writes are sent to it.

use std::sync::mpsc;

use conquest_overlay::{ClipboardWriter, OverlayError, Result};
use tracing::{debug, warn};

/// Something that can hold clipboard text.
trait TextSink {
    fn set_text(&mut self, text: String) -> std::result::Result<(), String>;
}

impl TextSink for arboard::Clipboard {
    fn set_text(&mut self, text: String) -> std::result::Result<(), String> {
        arboard::Clipboard::set_text(self, text).map_err(|e| e.to_string())
    }
}

struct WriteRequest {
    text: String,
    reply: mpsc::Sender<std::result::Result<(), String>>,
}

/// ClipboardWriter implementation using arboard.
pub struct PlatformClipboard {
    requests: mpsc::Sender<WriteRequest>,
}

impl PlatformClipboard {
    pub fn new() -> Self {
        Self::spawn(|| arboard::Clipboard::new().map_err(|e| e.to_string()))
    }

    /// Start the clipboard thread. `open` is retried on the next write
    /// until it succeeds; the handle it returns is then kept.
    fn spawn<S, F>(open: F) -> Self
    where
        S: TextSink + 'static,
        F: FnMut() -> std::result::Result<S, String> + Send + 'static,
    {
        let (requests, inbox) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("clipboard".to_string())
            .spawn(move || serve(inbox, open));
        if let Err(e) = spawned {
            warn!(error = %e, "Failed to start clipboard thread");
        }
        Self { requests }
    }
}

impl Default for PlatformClipboard {
    fn default() -> Self {
        Self::new()
    }
}

fn serve<S, F>(inbox: mpsc::Receiver<WriteRequest>, mut open: F)
where
    S: TextSink,
    F: FnMut() -> std::result::Result<S, String>,
{
    let mut sink: Option<S> = None;
    for request in inbox {
        if sink.is_none() {
            match open() {
                Ok(opened) => sink = Some(opened),
                Err(e) => warn!(error = %e, "Clipboard unavailable"),
            }
        }
        let result = match sink.as_mut() {
            Some(sink) => sink.set_text(request.text),
            None => Err("clipboard unavailable".to_string()),
        };
        // The writer may have given up waiting.
        let _ = request.reply.send(result);
    }
    debug!("Clipboard thread stopped");
}

impl ClipboardWriter for PlatformClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let (reply, response) = mpsc::channel();
        self.requests
            .send(WriteRequest {
                text: text.to_string(),
                reply,
            })
            .map_err(|_| OverlayError::Clipboard("clipboard thread is not running".to_string()))?;
        response
            .recv()
            .map_err(|_| OverlayError::Clipboard("clipboard thread stopped".to_string()))?
            .map_err(OverlayError::Clipboard)
    }
}
