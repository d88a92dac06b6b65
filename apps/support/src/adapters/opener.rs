//! Hands URLs to the desktop's default handler.

use async_trait::async_trait;
use conquest_handoff::{Url, UrlOpener};
use tokio::process::Command;
use tracing::{debug, warn};

#[cfg(target_os = "macos")]
const DEFAULT_OPEN_PROGRAM: &str = "open";
#[cfg(not(target_os = "macos"))]
const DEFAULT_OPEN_PROGRAM: &str = "xdg-open";

/// Opens URLs with `open` (macOS) or `xdg-open` (elsewhere).
///
/// The URL counts as accepted when the launcher exits successfully; a
/// launcher that cannot be spawned or exits non-zero means no handler.
/// If the caller stops waiting (dispatch timeout), the launcher is killed
/// so a handler cannot appear after the user was told it is unavailable.
#[derive(Debug, Clone)]
pub struct SystemUrlOpener {
    program: String,
    args: Vec<String>,
}

impl SystemUrlOpener {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_OPEN_PROGRAM)
    }

    /// Use a different launcher executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the URL (e.g. `gio` with `["open"]`).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for SystemUrlOpener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlOpener for SystemUrlOpener {
    async fn open(&self, url: &Url) -> bool {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(url.as_str()).kill_on_drop(true);

        let output = match command.output().await {
            Ok(output) => output,
            Err(e) => {
                warn!(program = %self.program, error = %e, "Failed to spawn URL launcher");
                return false;
            }
        };

        if output.status.success() {
            debug!(program = %self.program, scheme = url.scheme(), "URL launcher accepted");
            true
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(
                program = %self.program,
                scheme = url.scheme(),
                status = ?output.status.code(),
                stderr = %stderr.trim(),
                "URL launcher declined"
            );
            false
        }
    }
}
