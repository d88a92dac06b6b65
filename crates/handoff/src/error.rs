//! Error types for handoff request construction.

use thiserror::Error;

/// Why a handoff request failed validation.
///
/// These never escape `IntentDispatcher::dispatch`; they are carried inside a
/// [`HandoffRequest`](crate::HandoffRequest) so callers can route a malformed
/// request to a "misconfigured" overlay without attempting the handoff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandoffError {
    /// The configured phone string contains no digits.
    #[error("phone number has no digits")]
    EmptyPhoneNumber,

    /// The configured email address is empty.
    #[error("email address is empty")]
    EmptyEmailAddress,

    /// The constructed string did not parse as a URI.
    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The string parsed but has no scheme (e.g. "not a url").
    #[error("URI '{uri}' has no scheme")]
    MissingScheme { uri: String },
}

pub type Result<T> = std::result::Result<T, HandoffError>;
