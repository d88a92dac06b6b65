//! Handoff request construction and validation.
//!
//! Every builder returns a [`HandoffRequest`], never an error: a request that
//! fails validation is still a value, tagged [`Validation::Malformed`], so the
//! caller decides how to surface it.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::HandoffError;
use crate::target::ContactTarget;

/// Characters left as-is in mailto query values (RFC 3986 unreserved).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// What the OS is being asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffKind {
    Call,
    Email,
    WebLink,
}

impl std::fmt::Display for HandoffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandoffKind::Call => "call",
            HandoffKind::Email => "email",
            HandoffKind::WebLink => "web_link",
        };
        f.write_str(s)
    }
}

/// Result of validating a constructed URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid(Url),
    Malformed(HandoffError),
}

/// One dispatch attempt: kind, the URI string that was built, and whether
/// it validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRequest {
    kind: HandoffKind,
    uri: String,
    validation: Validation,
}

impl HandoffRequest {
    fn valid(kind: HandoffKind, url: Url) -> Self {
        Self {
            kind,
            uri: url.as_str().to_string(),
            validation: Validation::Valid(url),
        }
    }

    fn malformed(kind: HandoffKind, uri: impl Into<String>, error: HandoffError) -> Self {
        Self {
            kind,
            uri: uri.into(),
            validation: Validation::Malformed(error),
        }
    }

    fn parse(kind: HandoffKind, uri: String) -> Self {
        match Url::parse(&uri) {
            Ok(url) if url.scheme().is_empty() => {
                Self::malformed(kind, uri.clone(), HandoffError::MissingScheme { uri })
            }
            Ok(url) => Self::valid(kind, url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Self::malformed(kind, uri.clone(), HandoffError::MissingScheme { uri })
            }
            Err(e) => Self::malformed(
                kind,
                uri.clone(),
                HandoffError::InvalidUri {
                    uri,
                    reason: e.to_string(),
                },
            ),
        }
    }

    pub fn kind(&self) -> HandoffKind {
        self.kind
    }

    /// The URI string as constructed, whether or not it validated.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.validation, Validation::Valid(_))
    }

    /// The validated URL, if any.
    pub fn url(&self) -> Option<&Url> {
        match &self.validation {
            Validation::Valid(url) => Some(url),
            Validation::Malformed(_) => None,
        }
    }

    pub fn into_result(self) -> crate::Result<Url> {
        match self.validation {
            Validation::Valid(url) => Ok(url),
            Validation::Malformed(e) => Err(e),
        }
    }
}

/// Build a `tel://` request from the digit-only phone number.
///
/// Malformed only when the display string contains no digits.
pub fn build_call_request(target: &ContactTarget) -> HandoffRequest {
    let digits = target.phone_digits();
    if digits.is_empty() {
        return HandoffRequest::malformed(
            HandoffKind::Call,
            "tel://",
            HandoffError::EmptyPhoneNumber,
        );
    }
    HandoffRequest::parse(HandoffKind::Call, format!("tel://{}", digits))
}

/// Build a `mailto:` request with `subject` and `body` query parameters.
///
/// Both values are percent-encoded; line separators in the body survive as
/// `%0A`.
pub fn build_email_request(
    target: &ContactTarget,
    subject: &str,
    body_lines: &[String],
) -> HandoffRequest {
    let address = target.email().trim();
    if address.is_empty() {
        return HandoffRequest::malformed(
            HandoffKind::Email,
            "mailto:",
            HandoffError::EmptyEmailAddress,
        );
    }
    if address
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '?' | '#' | '&'))
    {
        let uri = format!("mailto:{}", address);
        return HandoffRequest::malformed(
            HandoffKind::Email,
            uri.clone(),
            HandoffError::InvalidUri {
                uri,
                reason: "address contains reserved characters".to_string(),
            },
        );
    }

    let body = body_lines.join(crate::target::EMAIL_LINE_SEPARATOR);
    let uri = format!(
        "mailto:{}?subject={}&body={}",
        address,
        utf8_percent_encode(subject, QUERY_VALUE),
        utf8_percent_encode(&body, QUERY_VALUE),
    );
    HandoffRequest::parse(HandoffKind::Email, uri)
}

/// Build a request for an external web page.
///
/// Malformed unless the string parses as a URI with a non-empty scheme.
pub fn build_web_request(raw: &str) -> HandoffRequest {
    HandoffRequest::parse(HandoffKind::WebLink, raw.to_string())
}
