//! The single-active-overlay state machine.
//!
//! Every transition runs to completion under one lock and bumps a
//! generation counter. Work that finishes later (a handoff verdict, the
//! copied-confirmation timer) remembers the generation it was started at and
//! is thrown away if anything else happened in the meantime. That is what
//! makes preemption safe: a late completion can never overwrite a newer
//! overlay.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use conquest_events::{event_names, AnnouncementEvent, EventBusRef};
use conquest_handoff::{
    build_call_request, build_email_request, build_web_request, ContactTarget, HandoffKind,
    HandoffOutcome, HandoffRequest, IntentDispatcher,
};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::clipboard::ClipboardWriterRef;
use crate::error::{OverlayError, Result};
use crate::state::{OverlayAction, OverlayState, EMAIL_COPIED_MESSAGE, NUMBER_COPIED_MESSAGE};
use crate::timer::DelayedAction;

/// How long the "email copied" confirmation stays up.
pub const DEFAULT_COPIED_DISPLAY: Duration = Duration::from_millis(1500);

/// Tunables for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySettings {
    pub copied_display: Duration,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            copied_display: DEFAULT_COPIED_DISPLAY,
        }
    }
}

/// Handle to an in-flight handoff started by the coordinator.
///
/// The coordinator applies the outcome on its own; awaiting the ticket is
/// only needed by callers that want to know when that has happened.
#[derive(Debug)]
pub struct DispatchTicket {
    kind: HandoffKind,
    handle: JoinHandle<HandoffOutcome>,
}

impl DispatchTicket {
    pub fn kind(&self) -> HandoffKind {
        self.kind
    }

    /// Whether the handoff has finished and its outcome been applied.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the handoff to finish and its outcome to be applied (or dropped as stale).
    pub async fn wait(self) -> HandoffOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(kind = %self.kind, error = %e, "handoff task did not complete");
                HandoffOutcome::Rejected
            }
        }
    }
}

struct Core {
    state: OverlayState,
    generation: u64,
    copied_timer: Option<DelayedAction>,
    /// Generation at which a compose handoff was started, while it is pending.
    compose_in_flight: Option<u64>,
    /// Events queued by the current update, published once the lock is released.
    outbox: Vec<Outgoing>,
}

struct Outgoing {
    topic: &'static str,
    payload: serde_json::Value,
}

struct Shared {
    target: ContactTarget,
    dispatcher: Arc<IntentDispatcher>,
    clipboard: ClipboardWriterRef,
    events: EventBusRef,
    settings: OverlaySettings,
    runtime: Handle,
    core: Mutex<Core>,
    /// Held while draining an outbox so events leave in transition order.
    publishing: Mutex<()>,
}

/// Owns which overlay is visible and drives handoffs on the user's behalf.
///
/// Cheap to clone; clones share state. Must be created inside a Tokio
/// runtime, which it uses for handoff completions and the confirmation
/// timer. Neither the event bus nor the clipboard is called with the state
/// lock held; the event bus may read [`state`](Self::state) but must not
/// call the mutating operations.
#[derive(Clone)]
pub struct OverlayCoordinator {
    shared: Arc<Shared>,
}

impl OverlayCoordinator {
    pub fn new(
        target: ContactTarget,
        dispatcher: Arc<IntentDispatcher>,
        clipboard: ClipboardWriterRef,
        events: EventBusRef,
    ) -> Result<Self> {
        Self::with_settings(target, dispatcher, clipboard, events, OverlaySettings::default())
    }

    pub fn with_settings(
        target: ContactTarget,
        dispatcher: Arc<IntentDispatcher>,
        clipboard: ClipboardWriterRef,
        events: EventBusRef,
        settings: OverlaySettings,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| OverlayError::NoRuntime)?;
        Ok(Self {
            shared: Arc::new(Shared {
                target,
                dispatcher,
                clipboard,
                events,
                settings,
                runtime,
                core: Mutex::new(Core {
                    state: OverlayState::None,
                    generation: 0,
                    copied_timer: None,
                    compose_in_flight: None,
                    outbox: Vec::new(),
                }),
                publishing: Mutex::new(()),
            }),
        })
    }

    pub fn target(&self) -> &ContactTarget {
        &self.shared.target
    }

    pub fn settings(&self) -> OverlaySettings {
        self.shared.settings
    }

    /// Snapshot of the visible overlay.
    pub fn state(&self) -> OverlayState {
        self.lock().state.clone()
    }

    /// Preempt whatever is showing and hand the support number to the dialer.
    ///
    /// Returns `None` without touching the overlay if the configured number
    /// has no digits.
    pub fn request_call(&self) -> Option<DispatchTicket> {
        let request = build_call_request(&self.shared.target);
        if !request.is_valid() {
            tracing::warn!(uri = request.uri(), "call request malformed, not dispatching");
            return None;
        }

        let generation = self.update(|core| self.transition(core, OverlayState::None));
        Some(self.spawn_dispatch(request, generation, |outcome| match outcome {
            HandoffOutcome::Accepted => OverlayState::None,
            HandoffOutcome::Rejected => OverlayState::CallUnavailable,
        }))
    }

    /// Show the compose / copy / cancel choice, replacing any overlay.
    pub fn request_email_menu(&self) {
        self.update(|core| {
            self.transition(core, OverlayState::EmailChoice);
        });
    }

    /// From the email choice: hand a pre-filled message to the mail composer.
    pub fn choose_compose(&self) -> Option<DispatchTicket> {
        let target = &self.shared.target;
        let request = build_email_request(target, target.email_subject(), target.email_body_lines());

        let generation = self.update(|core| {
            if core.state != OverlayState::EmailChoice {
                tracing::debug!(state = %core.state, "compose ignored outside email choice");
                return None;
            }
            if core.compose_in_flight == Some(core.generation) {
                tracing::debug!("compose already in flight");
                return None;
            }
            if !request.is_valid() {
                tracing::warn!(uri = request.uri(), "email request malformed, not dispatching");
                self.transition(core, OverlayState::EmailUnavailable);
                return None;
            }
            core.compose_in_flight = Some(core.generation);
            Some(core.generation)
        })?;

        Some(self.spawn_dispatch(request, generation, |outcome| match outcome {
            HandoffOutcome::Accepted => OverlayState::None,
            HandoffOutcome::Rejected => OverlayState::EmailUnavailable,
        }))
    }

    /// From the email choice: copy the address and show the confirmation.
    pub fn choose_copy(&self) {
        let armed_at = self.update(|core| {
            if core.state != OverlayState::EmailChoice {
                tracing::debug!(state = %core.state, "copy ignored outside email choice");
                return None;
            }
            Some(core.generation)
        });
        let Some(armed_at) = armed_at else {
            return;
        };

        let written = self.shared.clipboard.set_text(self.shared.target.email());
        self.update(|core| {
            if core.generation != armed_at {
                tracing::debug!(armed_at, current = core.generation, "copy superseded");
                return;
            }
            match written {
                Ok(()) => {
                    let generation = self.transition(core, OverlayState::EmailCopied);
                    self.announce(core, EMAIL_COPIED_MESSAGE);
                    core.copied_timer = Some(self.arm_copied_timer(generation));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not copy support email");
                    self.transition(core, OverlayState::EmailUnavailable);
                }
            }
        });
    }

    /// From the email choice: close it.
    pub fn choose_cancel(&self) {
        self.update(|core| {
            if core.state != OverlayState::EmailChoice {
                tracing::debug!(state = %core.state, "cancel ignored outside email choice");
                return;
            }
            self.transition(core, OverlayState::None);
        });
    }

    /// From an "unavailable" alert: copy the number or address, then close.
    pub fn copy(&self) {
        let pending = self.update(|core| match core.state {
            OverlayState::CallUnavailable => Some((
                core.generation,
                self.shared.target.phone_digits(),
                NUMBER_COPIED_MESSAGE,
            )),
            OverlayState::EmailUnavailable => Some((
                core.generation,
                self.shared.target.email().to_string(),
                EMAIL_COPIED_MESSAGE,
            )),
            _ => {
                tracing::debug!(state = %core.state, "copy ignored");
                None
            }
        });
        let Some((armed_at, text, announcement)) = pending else {
            return;
        };

        let written = self.shared.clipboard.set_text(&text);
        self.update(|core| {
            if core.generation != armed_at {
                tracing::debug!(armed_at, current = core.generation, "copy superseded");
                return;
            }
            match written {
                Ok(()) => self.announce(core, announcement),
                Err(e) => tracing::warn!(error = %e, "clipboard fallback failed"),
            }
            self.transition(core, OverlayState::None);
        });
    }

    /// Validate the blog link and present it, or show the misconfigured alert.
    pub fn request_blog(&self, raw: &str) {
        let next = match build_web_request(raw).into_result() {
            Ok(url) => OverlayState::BlogPresented(url),
            Err(e) => {
                tracing::warn!(error = %e, "blog link misconfigured");
                OverlayState::BlogUnavailable
            }
        };
        self.update(|core| {
            self.transition(core, next);
        });
    }

    /// Close a terminal overlay. A no-op in any other state.
    pub fn dismiss(&self) {
        self.update(|core| {
            if !core.state.is_terminal() {
                tracing::debug!(state = %core.state, "dismiss ignored");
                return;
            }
            self.transition(core, OverlayState::None);
        });
    }

    /// Route a button press on the current overlay.
    ///
    /// Actions the current overlay does not offer are ignored.
    pub fn perform(&self, action: OverlayAction) -> Option<DispatchTicket> {
        let state = self.state();
        if !state.offers(action) {
            tracing::debug!(state = %state, action = action.as_str(), "action not offered");
            return None;
        }

        match (action, state) {
            (OverlayAction::Compose, _) => return self.choose_compose(),
            (OverlayAction::CopyEmail, OverlayState::EmailChoice) => self.choose_copy(),
            (OverlayAction::CopyEmail | OverlayAction::CopyNumber, _) => self.copy(),
            (OverlayAction::Cancel, _) => self.choose_cancel(),
            (OverlayAction::Dismiss, _) => self.dismiss(),
        }
        None
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        self.shared.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the state lock, then publish whatever it queued.
    fn update<R>(&self, f: impl FnOnce(&mut Core) -> R) -> R {
        let mut core = self.lock();
        let result = f(&mut core);
        let outbox = std::mem::take(&mut core.outbox);
        if outbox.is_empty() {
            return result;
        }

        // Taken before the state lock is released so a later update cannot
        // overtake these events.
        let _publishing = self
            .shared
            .publishing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        drop(core);
        for event in outbox {
            self.shared.events.emit(event.topic, event.payload);
        }
        result
    }

    /// Replace the held overlay. Cancels the confirmation timer and
    /// invalidates anything pending; returns the new generation.
    fn transition(&self, core: &mut Core, next: OverlayState) -> u64 {
        core.copied_timer = None;
        core.compose_in_flight = None;
        core.generation += 1;

        if core.state != next {
            tracing::info!(
                from = %core.state,
                to = %next,
                generation = core.generation,
                "overlay transition"
            );
            core.state = next;
            let event = core.state.to_event(&self.shared.target);
            self.queue(core, event_names::OVERLAY_CHANGED, &event);
        }
        core.generation
    }

    fn announce(&self, core: &mut Core, message: &str) {
        let event = AnnouncementEvent {
            message: message.to_string(),
        };
        self.queue(core, event_names::ANNOUNCEMENT, &event);
    }

    fn queue<T: Serialize>(&self, core: &mut Core, topic: &'static str, event: &T) {
        match serde_json::to_value(event) {
            Ok(payload) => core.outbox.push(Outgoing { topic, payload }),
            Err(e) => tracing::warn!(topic, error = %e, "failed to serialize event"),
        }
    }

    fn arm_copied_timer(&self, generation: u64) -> DelayedAction {
        let this = self.clone();
        DelayedAction::arm(
            &self.shared.runtime,
            self.shared.settings.copied_display,
            move || this.expire_copied(generation),
        )
    }

    fn expire_copied(&self, armed_at: u64) {
        self.update(|core| {
            if core.generation != armed_at || core.state != OverlayState::EmailCopied {
                tracing::debug!(armed_at, current = core.generation, "stale auto-clear dropped");
                return;
            }
            self.transition(core, OverlayState::None);
        });
    }

    fn spawn_dispatch(
        &self,
        request: HandoffRequest,
        generation: u64,
        resolve: fn(HandoffOutcome) -> OverlayState,
    ) -> DispatchTicket {
        let this = self.clone();
        let kind = request.kind();
        let handle = self.shared.runtime.spawn(async move {
            let outcome = this.shared.dispatcher.dispatch(&request).await;
            this.complete(kind, generation, resolve(outcome));
            outcome
        });
        DispatchTicket { kind, handle }
    }

    fn complete(&self, kind: HandoffKind, armed_at: u64, next: OverlayState) {
        self.update(|core| {
            if core.generation != armed_at {
                tracing::debug!(
                    %kind,
                    armed_at,
                    current = core.generation,
                    "dropping stale handoff outcome"
                );
                return;
            }
            self.transition(core, next);
        });
    }
}

impl std::fmt::Debug for OverlayCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.lock();
        f.debug_struct("OverlayCoordinator")
            .field("state", &core.state)
            .field("generation", &core.generation)
            .field("copied_timer_armed", &core.copied_timer.is_some())
            .finish_non_exhaustive()
    }
}
