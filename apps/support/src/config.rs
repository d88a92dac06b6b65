//! Host configuration.
//!
//! One JSON file, read once at startup. Every field is optional; missing
//! ones take the values the contact screen ships with.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use conquest_handoff::{ContactTarget, DEFAULT_EMAIL_BODY_LINES, DEFAULT_EMAIL_SUBJECT};
use conquest_layout::HeaderBounds;
use conquest_overlay::OverlaySettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "CONQUEST_SUPPORT_CONFIG";

const CONFIG_DIR_NAME: &str = "conquest-support";
const CONFIG_FILE_NAME: &str = "config.json";

/// Error loading the host configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Contact details, handoff tunables and header bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportConfig {
    /// Phone number as shown to the user; dialled digits are derived from it.
    pub phone_display: String,
    pub email: String,
    pub email_subject: String,
    pub email_body_lines: Vec<String>,
    /// Checked when the blog is requested, not at load.
    pub blog_url: String,
    pub copied_display_ms: u64,
    pub dispatch_timeout_ms: u64,
    /// Program and leading arguments used to open URLs, e.g. `["gio", "open"]`.
    /// Empty means the platform default.
    pub url_launcher: Vec<String>,
    pub header: HeaderBounds,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            phone_display: "770-953-2500".to_string(),
            email: "support@csatlanta.com".to_string(),
            email_subject: DEFAULT_EMAIL_SUBJECT.to_string(),
            email_body_lines: DEFAULT_EMAIL_BODY_LINES
                .iter()
                .map(|line| line.to_string())
                .collect(),
            blog_url: "https://csatlanta.com/resources/blog/".to_string(),
            copied_display_ms: 1500,
            dispatch_timeout_ms: 10_000,
            url_launcher: Vec::new(),
            header: HeaderBounds::default(),
        }
    }
}

impl SupportConfig {
    pub fn contact_target(&self) -> ContactTarget {
        ContactTarget::new(self.phone_display.clone(), self.email.clone())
            .with_email_template(self.email_subject.clone(), self.email_body_lines.clone())
    }

    pub fn overlay_settings(&self) -> OverlaySettings {
        OverlaySettings {
            copied_display: Duration::from_millis(self.copied_display_ms),
        }
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }

    /// Reject values the core cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contact_target().phone_digits().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "phone_display '{}' contains no digits",
                self.phone_display
            )));
        }
        if self.email.trim().is_empty() {
            return Err(ConfigError::Invalid("email is empty".to_string()));
        }
        if self.copied_display_ms == 0 {
            return Err(ConfigError::Invalid(
                "copied_display_ms must be positive".to_string(),
            ));
        }
        if self.dispatch_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "dispatch_timeout_ms must be positive".to_string(),
            ));
        }

        if self.url_launcher.first().is_some_and(|program| program.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "url_launcher program is empty".to_string(),
            ));
        }

        let HeaderBounds {
            ceiling,
            minimum_fallback,
        } = self.header;
        if !ceiling.is_finite() || ceiling <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "header.ceiling must be a positive number, got {ceiling}"
            )));
        }
        if !minimum_fallback.is_finite() || minimum_fallback <= 0.0 || minimum_fallback > ceiling {
            return Err(ConfigError::Invalid(format!(
                "header.minimum_fallback must be in (0, {ceiling}], got {minimum_fallback}"
            )));
        }
        Ok(())
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Argument(PathBuf),
    Environment(PathBuf),
    UserDir(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Argument(p) | ConfigSource::Environment(p) | ConfigSource::UserDir(p) => {
                Some(p)
            }
            ConfigSource::Defaults => None,
        }
    }
}

/// Pick the config source: argument, then environment, then the user
/// config file if present.
///
/// An explicitly named file is returned even if it does not exist, so that
/// a typo surfaces as a read error instead of silently using defaults.
pub fn resolve_source(
    arg: Option<PathBuf>,
    env: Option<OsString>,
    user_file: Option<PathBuf>,
) -> ConfigSource {
    if let Some(path) = arg {
        return ConfigSource::Argument(path);
    }
    if let Some(value) = env.filter(|v| !v.is_empty()) {
        return ConfigSource::Environment(PathBuf::from(value));
    }
    match user_file {
        Some(path) if path.is_file() => ConfigSource::UserDir(path),
        _ => ConfigSource::Defaults,
    }
}

/// Per-user config file location.
///
/// Platform-specific paths:
/// - macOS: ~/Library/Application Support/conquest-support/config.json
/// - Linux: ~/.config/conquest-support/config.json
/// - Windows: %APPDATA%/conquest-support/config.json
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve, read and validate the configuration.
pub fn load(arg: Option<PathBuf>) -> Result<(SupportConfig, ConfigSource), ConfigError> {
    let source = resolve_source(arg, std::env::var_os(CONFIG_ENV), user_config_file());

    let config = match source.path() {
        Some(path) => load_from_path(path)?,
        None => {
            debug!("No config file found, using defaults");
            SupportConfig::default()
        }
    };
    config.validate()?;

    info!(source = ?source, "Configuration loaded");
    Ok((config, source))
}

/// Read one config file. Does not validate.
pub fn load_from_path(path: &Path) -> Result<SupportConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
