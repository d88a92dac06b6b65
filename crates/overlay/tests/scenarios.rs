//! End-to-end overlay scenarios against scripted host capabilities.
//!
//! Time is paused, so the 1.5 s confirmation timer is driven with
//! `tokio::time::sleep` / `advance` instead of wall-clock waits.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use conquest_events::{event_names, AnnouncementEvent, InMemoryEventBus, OverlayChangedEvent};
use conquest_handoff::{ContactTarget, HandoffKind, HandoffOutcome, IntentDispatcher, Url, UrlOpener};
use conquest_overlay::{
    InMemoryClipboard, OverlayAction, OverlayCoordinator, OverlayState, EMAIL_COPIED_MESSAGE,
};
use tokio::sync::Notify;

const BLOG_URL: &str = "https://csatlanta.com/resources/blog/";

/// Opener with a fixed verdict that can optionally hold each call until released.
struct ScriptedOpener {
    accept: bool,
    gate: Option<Arc<Notify>>,
    opened: Mutex<Vec<Url>>,
}

impl ScriptedOpener {
    fn immediate(accept: bool) -> Arc<Self> {
        Arc::new(Self {
            accept,
            gate: None,
            opened: Mutex::new(Vec::new()),
        })
    }

    fn gated(accept: bool, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            accept,
            gate: Some(gate),
            opened: Mutex::new(Vec::new()),
        })
    }

    fn opened(&self) -> Vec<Url> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlOpener for ScriptedOpener {
    async fn open(&self, url: &Url) -> bool {
        self.opened.lock().unwrap().push(url.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.accept
    }
}

struct Harness {
    coordinator: OverlayCoordinator,
    opener: Arc<ScriptedOpener>,
    clipboard: Arc<InMemoryClipboard>,
    events: Arc<InMemoryEventBus>,
}

impl Harness {
    fn new(opener: Arc<ScriptedOpener>) -> Self {
        let clipboard = Arc::new(InMemoryClipboard::new());
        let events = Arc::new(InMemoryEventBus::new());
        let coordinator = OverlayCoordinator::new(
            ContactTarget::new("770-953-2500", "support@csatlanta.com"),
            Arc::new(IntentDispatcher::new(opener.clone())),
            clipboard.clone(),
            events.clone(),
        )
        .expect("inside a runtime");
        Self {
            coordinator,
            opener,
            clipboard,
            events,
        }
    }

    fn overlay_history(&self) -> Vec<String> {
        self.events
            .payloads_for::<OverlayChangedEvent>(event_names::OVERLAY_CHANGED)
            .into_iter()
            .map(|e| e.overlay)
            .collect()
    }
}

// =============================================================================
// Call
// =============================================================================

mod call {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rejected_call_offers_copy_fallback() {
        let h = Harness::new(ScriptedOpener::immediate(false));

        let outcome = h.coordinator.request_call().unwrap().wait().await;
        assert_eq!(outcome, HandoffOutcome::Rejected);
        assert_eq!(h.coordinator.state(), OverlayState::CallUnavailable);
        assert_eq!(h.opener.opened()[0].as_str(), "tel://7709532500");

        h.coordinator.copy();
        assert_eq!(h.clipboard.contents().as_deref(), Some("7709532500"));
        assert_eq!(h.coordinator.state(), OverlayState::None);
        assert_eq!(h.overlay_history(), vec!["call_unavailable", "none"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_call_emits_nothing() {
        let h = Harness::new(ScriptedOpener::immediate(true));
        let ticket = h.coordinator.request_call().unwrap();
        assert_eq!(ticket.kind(), HandoffKind::Call);
        ticket.wait().await;

        assert_eq!(h.coordinator.state(), OverlayState::None);
        assert!(h.overlay_history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_call_unavailable() {
        let h = Harness::new(ScriptedOpener::immediate(false));
        h.coordinator.request_call().unwrap().wait().await;

        h.coordinator.dismiss();
        assert_eq!(h.coordinator.state(), OverlayState::None);
        assert!(h.clipboard.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_call_times_out_as_unavailable() {
        let gate = Arc::new(Notify::new());
        let h = Harness::new(ScriptedOpener::gated(true, gate));

        // Never released: the dispatcher's timeout decides.
        let outcome = h.coordinator.request_call().unwrap().wait().await;
        assert_eq!(outcome, HandoffOutcome::Rejected);
        assert_eq!(h.coordinator.state(), OverlayState::CallUnavailable);
    }
}

// =============================================================================
// Email
// =============================================================================

mod email {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_copy_confirmation_clears_itself() {
        let h = Harness::new(ScriptedOpener::immediate(true));

        h.coordinator.request_email_menu();
        h.coordinator.choose_copy();
        assert_eq!(h.coordinator.state(), OverlayState::EmailCopied);
        assert_eq!(h.clipboard.contents().as_deref(), Some("support@csatlanta.com"));

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert_eq!(h.coordinator.state(), OverlayState::EmailCopied);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(h.coordinator.state(), OverlayState::None);
        assert_eq!(
            h.overlay_history(),
            vec!["email_choice", "email_copied", "none"]
        );

        let announcement: AnnouncementEvent =
            h.events.last_for(event_names::ANNOUNCEMENT).unwrap();
        assert_eq!(announcement.message, EMAIL_COPIED_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_compose_accepted_closes_choice() {
        let h = Harness::new(ScriptedOpener::immediate(true));

        h.coordinator.request_email_menu();
        h.coordinator.choose_compose().unwrap().wait().await;

        assert_eq!(h.coordinator.state(), OverlayState::None);
        let opened = h.opener.opened();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].scheme(), "mailto");
        assert!(opened[0].as_str().contains("body=Name%3A%0ACompany"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_compose_rejected_shows_unavailable_with_copy() {
        let h = Harness::new(ScriptedOpener::immediate(false));

        h.coordinator.request_email_menu();
        h.coordinator.choose_compose().unwrap().wait().await;
        assert_eq!(h.coordinator.state(), OverlayState::EmailUnavailable);

        h.coordinator.perform(OverlayAction::CopyEmail);
        assert_eq!(h.clipboard.contents().as_deref(), Some("support@csatlanta.com"));
        assert_eq!(h.coordinator.state(), OverlayState::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_choice_stays_up_while_compose_in_flight() {
        let gate = Arc::new(Notify::new());
        let h = Harness::new(ScriptedOpener::gated(false, gate.clone()));

        h.coordinator.request_email_menu();
        let ticket = h.coordinator.choose_compose().unwrap();
        tokio::task::yield_now().await;

        assert_eq!(h.coordinator.state(), OverlayState::EmailChoice);
        // A second tap while the first is pending does not dispatch again.
        assert!(h.coordinator.choose_compose().is_none());

        gate.notify_one();
        ticket.wait().await;
        assert_eq!(h.coordinator.state(), OverlayState::EmailUnavailable);
        assert_eq!(h.opener.opened().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_closes_choice() {
        let h = Harness::new(ScriptedOpener::immediate(true));
        h.coordinator.request_email_menu();
        h.coordinator.choose_cancel();
        assert_eq!(h.coordinator.state(), OverlayState::None);
        assert!(h.clipboard.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_failure_falls_back_to_unavailable() {
        let h = Harness::new(ScriptedOpener::immediate(true));
        h.clipboard.set_failing(true);

        h.coordinator.request_email_menu();
        h.coordinator.choose_copy();
        assert_eq!(h.coordinator.state(), OverlayState::EmailUnavailable);
        assert!(h.events.events_for(event_names::ANNOUNCEMENT).is_empty());
    }
}

// =============================================================================
// Blog
// =============================================================================

mod blog {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_invalid_link_is_unavailable() {
        let h = Harness::new(ScriptedOpener::immediate(true));

        h.coordinator.request_blog("not a url");
        assert_eq!(h.coordinator.state(), OverlayState::BlogUnavailable);

        h.coordinator.dismiss();
        assert_eq!(h.coordinator.state(), OverlayState::None);
        assert!(h.opener.opened().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_link_is_presented() {
        let h = Harness::new(ScriptedOpener::immediate(true));

        h.coordinator.request_blog(BLOG_URL);
        assert_eq!(
            h.coordinator.state(),
            OverlayState::BlogPresented(Url::parse(BLOG_URL).unwrap())
        );

        let event: OverlayChangedEvent = h.events.last_for(event_names::OVERLAY_CHANGED).unwrap();
        assert_eq!(event.url.as_deref(), Some(BLOG_URL));

        h.coordinator.dismiss();
        assert_eq!(h.coordinator.state(), OverlayState::None);
    }
}

// =============================================================================
// Preemption
// =============================================================================

mod preemption {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_call_preempts_copied_confirmation() {
        let h = Harness::new(ScriptedOpener::immediate(false));

        h.coordinator.request_email_menu();
        h.coordinator.choose_copy();
        tokio::time::sleep(Duration::from_millis(500)).await;

        h.coordinator.request_call().unwrap().wait().await;
        assert_eq!(h.coordinator.state(), OverlayState::CallUnavailable);

        // Well past the original deadline: the old auto-clear must not fire.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.coordinator.state(), OverlayState::CallUnavailable);
        assert_eq!(
            h.overlay_history(),
            vec!["email_choice", "email_copied", "none", "call_unavailable"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_call_preempts_copied_confirmation() {
        let h = Harness::new(ScriptedOpener::immediate(true));

        h.coordinator.request_email_menu();
        h.coordinator.choose_copy();
        h.coordinator.request_call().unwrap().wait().await;
        assert_eq!(h.coordinator.state(), OverlayState::None);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.overlay_history(), vec!["email_choice", "email_copied", "none"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_copy_restarts_confirmation_timer() {
        let h = Harness::new(ScriptedOpener::immediate(true));

        h.coordinator.request_email_menu();
        h.coordinator.choose_copy();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        h.coordinator.request_email_menu();
        h.coordinator.choose_copy();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        // First timer's deadline has passed, second has not.
        assert_eq!(h.coordinator.state(), OverlayState::EmailCopied);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(h.coordinator.state(), OverlayState::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_compose_outcome_does_not_replace_newer_overlay() {
        let gate = Arc::new(Notify::new());
        let h = Harness::new(ScriptedOpener::gated(false, gate.clone()));

        h.coordinator.request_email_menu();
        let ticket = h.coordinator.choose_compose().unwrap();
        tokio::task::yield_now().await;

        h.coordinator.request_blog(BLOG_URL);
        gate.notify_one();
        assert_eq!(ticket.wait().await, HandoffOutcome::Rejected);

        assert!(matches!(
            h.coordinator.state(),
            OverlayState::BlogPresented(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_call_outcome_does_not_replace_email_menu() {
        let gate = Arc::new(Notify::new());
        let h = Harness::new(ScriptedOpener::gated(false, gate.clone()));

        let ticket = h.coordinator.request_call().unwrap();
        tokio::task::yield_now().await;
        h.coordinator.request_email_menu();

        gate.notify_one();
        ticket.wait().await;
        assert_eq!(h.coordinator.state(), OverlayState::EmailChoice);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_event_names_exactly_one_overlay() {
        let h = Harness::new(ScriptedOpener::immediate(false));

        h.coordinator.request_email_menu();
        h.coordinator.choose_copy();
        h.coordinator.request_blog("not a url");
        h.coordinator.request_email_menu();
        h.coordinator.choose_compose().unwrap().wait().await;
        h.coordinator.request_blog(BLOG_URL);
        h.coordinator.request_call().unwrap().wait().await;
        h.coordinator.dismiss();
        h.coordinator.dismiss();

        let history = h.overlay_history();
        assert_eq!(
            history,
            vec![
                "email_choice",
                "email_copied",
                "blog_unavailable",
                "email_choice",
                "email_unavailable",
                "blog_presented",
                "none",
                "call_unavailable",
                "none",
            ]
        );
        assert_eq!(h.coordinator.state(), OverlayState::None);
    }
}
