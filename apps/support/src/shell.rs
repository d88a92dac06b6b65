//! Line-oriented command shell standing in for the contact screen.
//!
//! Each line is one user gesture (a tap, a layout pass). Overlay changes are
//! not printed here; they reach the terminal through the event bus.

use std::str::FromStr;

use conquest_events::{event_names, EventBusRef, HeaderReservedEvent};
use conquest_layout::{HeaderReservationTracker, Reservation};
use conquest_overlay::{DispatchTicket, OverlayCoordinator};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

pub const HELP: &str = "\
commands:
  call          dial the support number
  email         open the email choice
  compose       (email choice) compose a message
  copy-email    (email choice) copy the address
  cancel        (email choice) close it
  copy          (unavailable alert) copy the number or address
  blog          open the blog
  dismiss       close the current alert or blog viewer
  header <h>    report a measured header height
  state         show the current overlay
  help          show this list
  quit          exit";

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Call,
    Email,
    Compose,
    CopyEmail,
    Cancel,
    Copy,
    Blog,
    Dismiss,
    Header(f64),
    State,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'header' needs a height")]
    MissingHeight,
    #[error("'{0}' is not a number")]
    InvalidHeight(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();

        let command = match name.as_str() {
            "call" => Command::Call,
            "email" => Command::Email,
            "compose" => Command::Compose,
            "copy-email" => Command::CopyEmail,
            "cancel" => Command::Cancel,
            "copy" => Command::Copy,
            "blog" => Command::Blog,
            "dismiss" | "ok" => Command::Dismiss,
            "header" => {
                let raw = words.next().ok_or(CommandError::MissingHeight)?;
                let height = raw
                    .parse::<f64>()
                    .map_err(|_| CommandError::InvalidHeight(raw.to_string()))?;
                Command::Header(height)
            }
            "state" => Command::State,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Drives the coordinator and header tracker from commands.
pub struct Shell {
    coordinator: OverlayCoordinator,
    tracker: HeaderReservationTracker,
    events: EventBusRef,
    blog_url: String,
    /// Handoffs started by this shell whose outcome has not been applied yet.
    in_flight: Vec<DispatchTicket>,
}

impl Shell {
    pub fn new(
        coordinator: OverlayCoordinator,
        tracker: HeaderReservationTracker,
        events: EventBusRef,
        blog_url: impl Into<String>,
    ) -> Self {
        Self {
            coordinator,
            tracker,
            events,
            blog_url: blog_url.into(),
            in_flight: Vec::new(),
        }
    }

    pub fn coordinator(&self) -> &OverlayCoordinator {
        &self.coordinator
    }

    pub fn tracker(&self) -> &HeaderReservationTracker {
        &self.tracker
    }

    /// Apply one command. Returns the ticket of a handoff it started.
    pub fn execute(&mut self, command: Command) -> Option<DispatchTicket> {
        debug!(?command, "Executing command");
        match command {
            Command::Call => return self.coordinator.request_call(),
            Command::Email => self.coordinator.request_email_menu(),
            Command::Compose => return self.coordinator.choose_compose(),
            Command::CopyEmail => self.coordinator.choose_copy(),
            Command::Cancel => self.coordinator.choose_cancel(),
            Command::Copy => self.coordinator.copy(),
            Command::Blog => self.coordinator.request_blog(&self.blog_url),
            Command::Dismiss => self.coordinator.dismiss(),
            Command::Header(height) => self.measure_header(height),
            Command::State => println!("{}", self.describe()),
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
        None
    }

    /// Human-readable summary of the overlay and header reservation.
    pub fn describe(&self) -> String {
        let state = self.coordinator().state();
        let overlay = match state.presentation(self.coordinator().target()) {
            Some(p) => {
                let actions: Vec<&str> = p.actions.iter().map(|a| a.label()).collect();
                match p.title {
                    Some(title) => format!("{state}: {title}: {} [{}]", p.message, actions.join(", ")),
                    None => format!("{state}: {}", p.message),
                }
            }
            None => state.to_string(),
        };
        let tracker = self.tracker();
        format!(
            "overlay {overlay}; header reserved {} (floor {})",
            tracker.reserved(),
            tracker.bounds().minimum_fallback
        )
    }

    fn measure_header(&mut self, height: f64) {
        if let Reservation::Updated(reserved_height) = self.tracker.accept(height) {
            match serde_json::to_value(HeaderReservedEvent { reserved_height }) {
                Ok(payload) => self.events.emit(event_names::HEADER_RESERVED, payload),
                Err(e) => warn!(error = %e, "Failed to serialize header event"),
            }
        }
    }

    /// Number of handoffs still waiting for the host's verdict.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Read commands until `quit` or end of input.
    ///
    /// Does not return while a handoff it started is still pending, so the
    /// outcome is applied before the runtime goes away.
    pub async fn run<R>(&mut self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            self.in_flight.retain(|ticket| !ticket.is_finished());
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    if let Some(ticket) = self.execute(command) {
                        self.in_flight.push(ticket);
                    }
                }
                Err(e) => println!("{e}"),
            }
        }

        self.settle().await;
        info!("Shell finished");
        Ok(())
    }

    /// Wait for every pending handoff to finish.
    async fn settle(&mut self) {
        if !self.in_flight.is_empty() {
            info!(pending = self.in_flight.len(), "Waiting for pending handoffs");
        }
        for ticket in self.in_flight.drain(..) {
            let kind = ticket.kind();
            let outcome = ticket.wait().await;
            debug!(%kind, ?outcome, "Pending handoff settled");
        }
    }
}
