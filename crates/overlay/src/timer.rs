//! Cancellable delayed action.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Runs a closure once after a delay unless cancelled first.
///
/// Dropping the handle cancels it, so replacing a stored timer is enough to
/// stop the old one.
#[derive(Debug)]
pub struct DelayedAction {
    token: CancellationToken,
}

impl DelayedAction {
    /// Spawn the delay on `runtime` and return its handle.
    pub fn arm<F>(runtime: &Handle, after: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.child_token();

        runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    tracing::trace!("delayed action cancelled");
                }
                _ = tokio::time::sleep(after) => on_fire(),
            }
        });

        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for DelayedAction {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
