//! Hands validated requests to the host OS.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::request::HandoffRequest;

/// How long to wait for the host before treating a handoff as declined.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Host capability for opening a URL (dialer, mail composer, browser).
///
/// Implementations report whether the OS accepted the URL. Declining is an
/// expected outcome (no telephony, no mail account) and is reported as
/// `false`, not as an error.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, url: &Url) -> bool;
}

/// Shared opener reference.
pub type UrlOpenerRef = Arc<dyn UrlOpener>;

/// What the OS did with a handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffOutcome {
    Accepted,
    Rejected,
}

impl HandoffOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, HandoffOutcome::Accepted)
    }
}

impl From<bool> for HandoffOutcome {
    fn from(accepted: bool) -> Self {
        if accepted {
            HandoffOutcome::Accepted
        } else {
            HandoffOutcome::Rejected
        }
    }
}

/// Attempts one external handoff at a time and reports the outcome.
///
/// `dispatch` never fails: a malformed request, a host that declines, and a
/// host that does not answer within the timeout all resolve to
/// [`HandoffOutcome::Rejected`].
pub struct IntentDispatcher {
    opener: UrlOpenerRef,
    timeout: Duration,
}

impl IntentDispatcher {
    pub fn new(opener: UrlOpenerRef) -> Self {
        Self {
            opener,
            timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Hand the request to the host and wait for its verdict.
    ///
    /// The returned future resolves exactly once.
    pub async fn dispatch(&self, request: &HandoffRequest) -> HandoffOutcome {
        let Some(url) = request.url() else {
            tracing::warn!(
                kind = %request.kind(),
                uri = request.uri(),
                "refusing to dispatch malformed request"
            );
            return HandoffOutcome::Rejected;
        };

        let outcome = match tokio::time::timeout(self.timeout, self.opener.open(url)).await {
            Ok(accepted) => HandoffOutcome::from(accepted),
            Err(_) => {
                tracing::warn!(
                    kind = %request.kind(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "handoff timed out, treating as rejected"
                );
                HandoffOutcome::Rejected
            }
        };

        tracing::info!(kind = %request.kind(), ?outcome, "handoff completed");
        outcome
    }
}

impl std::fmt::Debug for IntentDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentDispatcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
