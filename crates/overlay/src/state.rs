//! Overlay states and what each one shows.

use conquest_events::OverlayChangedEvent;
use conquest_handoff::{ContactTarget, Url};
use serde::{Deserialize, Serialize};

/// The one overlay currently shown above the contact screen.
///
/// A single tagged value rather than a flag per surface: two overlays can
/// never be visible together because there is nowhere to store the second.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "overlay", content = "url", rename_all = "snake_case")]
pub enum OverlayState {
    #[default]
    None,
    /// The dialer declined; offers copy-number and dismiss.
    CallUnavailable,
    /// The mail composer declined; offers copy-email and dismiss.
    EmailUnavailable,
    /// Compose / copy / cancel choice shown before any mail handoff.
    EmailChoice,
    /// Transient confirmation, cleared by a timer.
    EmailCopied,
    /// The blog link failed validation.
    BlogUnavailable,
    /// Embedded viewer open on this page.
    BlogPresented(Url),
}

impl OverlayState {
    /// States left only by an explicit dismiss (or preemption).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OverlayState::CallUnavailable
                | OverlayState::EmailUnavailable
                | OverlayState::BlogUnavailable
                | OverlayState::BlogPresented(_)
        )
    }

    /// Stable snake_case name, as used in events.
    pub fn name(&self) -> &'static str {
        match self {
            OverlayState::None => "none",
            OverlayState::CallUnavailable => "call_unavailable",
            OverlayState::EmailUnavailable => "email_unavailable",
            OverlayState::EmailChoice => "email_choice",
            OverlayState::EmailCopied => "email_copied",
            OverlayState::BlogUnavailable => "blog_unavailable",
            OverlayState::BlogPresented(_) => "blog_presented",
        }
    }

    /// Actions offered while this overlay is up, in display order.
    pub fn actions(&self) -> &'static [OverlayAction] {
        match self {
            OverlayState::None | OverlayState::EmailCopied => &[],
            OverlayState::CallUnavailable => &[OverlayAction::CopyNumber, OverlayAction::Dismiss],
            OverlayState::EmailUnavailable => &[OverlayAction::CopyEmail, OverlayAction::Dismiss],
            OverlayState::EmailChoice => &[
                OverlayAction::Compose,
                OverlayAction::CopyEmail,
                OverlayAction::Cancel,
            ],
            OverlayState::BlogUnavailable | OverlayState::BlogPresented(_) => {
                &[OverlayAction::Dismiss]
            }
        }
    }

    pub fn offers(&self, action: OverlayAction) -> bool {
        self.actions().contains(&action)
    }

    /// Title, message and actions to render, or `None` when nothing is shown.
    pub fn presentation(&self, target: &ContactTarget) -> Option<OverlayPresentation> {
        let (title, message) = match self {
            OverlayState::None => return None,
            OverlayState::CallUnavailable => (
                Some("Call Not Available"),
                format!(
                    "This device cannot place calls. Support number: {}",
                    target.phone_display()
                ),
            ),
            OverlayState::EmailUnavailable => (
                Some("Email Not Available"),
                format!("Could not open mail. Support email: {}", target.email()),
            ),
            OverlayState::EmailChoice => (Some("Email Support"), "Choose an option".to_string()),
            OverlayState::EmailCopied => (None, EMAIL_COPIED_MESSAGE.to_string()),
            OverlayState::BlogUnavailable => (
                Some("Blog Unavailable"),
                "The blog link is misconfigured. Please try again later.".to_string(),
            ),
            OverlayState::BlogPresented(url) => (Some("Conquest Blog"), url.to_string()),
        };

        Some(OverlayPresentation {
            title: title.map(str::to_string),
            message,
            actions: self.actions().to_vec(),
        })
    }

    /// Build the `overlay:changed` payload for this state.
    pub fn to_event(&self, target: &ContactTarget) -> OverlayChangedEvent {
        let mut event = OverlayChangedEvent::new(self.name());
        if let OverlayState::BlogPresented(url) = self {
            event.url = Some(url.to_string());
        }
        if let Some(presentation) = self.presentation(target) {
            event.title = presentation.title;
            event.message = Some(presentation.message);
            event.actions = presentation
                .actions
                .iter()
                .map(|a| a.as_str().to_string())
                .collect();
        }
        event
    }
}

impl std::fmt::Display for OverlayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayState::BlogPresented(url) => write!(f, "blog_presented({})", url),
            other => f.write_str(other.name()),
        }
    }
}

/// Shown while [`OverlayState::EmailCopied`] is up, and announced.
pub const EMAIL_COPIED_MESSAGE: &str = "Support email copied to clipboard.";

/// Announced after the support number is copied.
pub const NUMBER_COPIED_MESSAGE: &str = "Support number copied to clipboard.";

/// A button on an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayAction {
    CopyNumber,
    CopyEmail,
    Compose,
    Cancel,
    Dismiss,
}

impl OverlayAction {
    pub fn as_str(self) -> &'static str {
        match self {
            OverlayAction::CopyNumber => "copy_number",
            OverlayAction::CopyEmail => "copy_email",
            OverlayAction::Compose => "compose",
            OverlayAction::Cancel => "cancel",
            OverlayAction::Dismiss => "dismiss",
        }
    }

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            OverlayAction::CopyNumber => "Copy Number",
            OverlayAction::CopyEmail => "Copy Email",
            OverlayAction::Compose => "Compose Email",
            OverlayAction::Cancel => "Cancel",
            OverlayAction::Dismiss => "OK",
        }
    }
}

/// Renderable content of an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPresentation {
    pub title: Option<String>,
    pub message: String,
    pub actions: Vec<OverlayAction>,
}
