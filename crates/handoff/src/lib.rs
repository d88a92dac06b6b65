//! External handoff for the support contact screen.
//!
//! Builds telephone, mail and web requests from the configured
//! [`ContactTarget`], validates them, and hands valid ones to the host
//! through a [`UrlOpener`] capability.
//!
//! # Example
//!
//! ```ignore
//! use conquest_handoff::{build_call_request, ContactTarget, IntentDispatcher};
//!
//! let target = ContactTarget::new("770-953-2500", "support@csatlanta.com");
//! let dispatcher = IntentDispatcher::new(opener);
//!
//! let request = build_call_request(&target);
//! let outcome = dispatcher.dispatch(&request).await;
//! ```

mod dispatcher;
mod error;
mod request;
mod target;

pub use dispatcher::{
    HandoffOutcome, IntentDispatcher, UrlOpener, UrlOpenerRef, DEFAULT_DISPATCH_TIMEOUT,
};
pub use error::{HandoffError, Result};
pub use request::{
    build_call_request, build_email_request, build_web_request, HandoffKind, HandoffRequest,
    Validation,
};
pub use target::{
    ContactTarget, DEFAULT_EMAIL_BODY_LINES, DEFAULT_EMAIL_SUBJECT, EMAIL_LINE_SEPARATOR,
};

// Re-exported so callers and capability implementations agree on the URL type.
pub use url::Url;
