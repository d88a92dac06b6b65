//! Headless host for the support contact screen.
//!
//! Wires the overlay coordinator and header tracker to the real clipboard
//! and URL launcher, then reads gestures from stdin.

mod adapters;
mod config;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use conquest_events::EventBusRef;
use conquest_handoff::IntentDispatcher;
use conquest_layout::HeaderReservationTracker;
use conquest_overlay::OverlayCoordinator;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::adapters::{ConsoleEventBus, PlatformClipboard, SystemUrlOpener};
use crate::shell::Shell;

const USAGE: &str = "\
usage: conquest-support [--config <path>]

Reads commands from stdin; type 'help' for the list.
Config is taken from --config, then $CONQUEST_SUPPORT_CONFIG, then the
per-user config directory, then built-in defaults.";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    help: bool,
}

fn parse_args<I>(args: I) -> anyhow::Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "-c" | "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            other => match other.strip_prefix("--config=") {
                Some(path) if !path.is_empty() => parsed.config = Some(PathBuf::from(path)),
                _ => bail!("unexpected argument '{other}'\n\n{USAGE}"),
            },
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,conquest=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let (config, source) = config::load(args.config).context("failed to load configuration")?;
    tracing::info!(
        source = ?source,
        phone = %config.phone_display,
        email = %config.email,
        "Starting support screen host"
    );

    let opener = match config.url_launcher.split_first() {
        Some((program, args)) => SystemUrlOpener::with_program(program.as_str()).with_args(args),
        None => SystemUrlOpener::new(),
    };
    tracing::debug!(launcher = opener.program(), "Using system URL launcher");
    let dispatcher = IntentDispatcher::new(Arc::new(opener)).with_timeout(config.dispatch_timeout());
    tracing::debug!(
        timeout_ms = dispatcher.timeout().as_millis() as u64,
        "Handoff dispatcher ready"
    );
    let events: EventBusRef = Arc::new(ConsoleEventBus::new());
    let coordinator = OverlayCoordinator::with_settings(
        config.contact_target(),
        Arc::new(dispatcher),
        Arc::new(PlatformClipboard::new()),
        events.clone(),
        config.overlay_settings(),
    )?;
    let tracker = HeaderReservationTracker::new(config.header);

    let mut shell = Shell::new(coordinator, tracker, events, config.blog_url.clone());
    println!("{}", shell.describe());
    shell.run(BufReader::new(tokio::io::stdin())).await
}
