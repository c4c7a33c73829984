//! Controller - The Conversation Session Core
//!
//! The Controller owns one conversation session: the transcript, the input
//! lifecycle, the pending-exchange state, and the crisis-escalation
//! behavior. It is surface-agnostic; it receives [`SurfaceEvent`]s and
//! answers with [`ControllerMessage`]s over the channel injected at
//! construction.
//!
//! # State machine
//!
//! `Idle` -> `AwaitingReply` on a successful send; back to `Idle` when the
//! reply (or failure) arrives. `Failed` is a transient, surface-visible
//! state passed through on the failure path. `send_message` is a strict
//! no-op outside `Idle`, so at most one exchange is ever in flight.
//!
//! # Polling
//!
//! The responder exchange is spawned onto the runtime and its result is
//! observed by [`Controller::poll_reply`]; scheduled follow-ups surface
//! through [`Controller::poll_timers`]. Both are non-blocking, so the
//! embedding event loop stays responsive while a reply is pending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::carryover::CarryoverSlot;
use crate::events::SurfaceEvent;
use crate::formatter;
use crate::messages::{
    ControllerMessage, ControllerState, EventId, LayoutDirective, MessageId, MessageRole,
    NotifyLevel, SessionId,
};
use crate::responder::{Reply, ReplyRequest, Responder};
use crate::session::{self, Session};
use crate::timers::{TimerFired, Timers};

/// Synthesized bot reply when the responder exchange fails
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// One-shot follow-up appended after a crisis-classified reply
pub const CRISIS_FOLLOW_UP: &str =
    "Would you like me to provide some immediate coping strategies while you reach out for help?";

/// Opening bot message after the transcript is cleared
pub const CLEAR_GREETING: &str = "Chat cleared. How can I help you today?";

/// Notification shown when the responder exchange fails
const CONNECTION_WARNING: &str = "Connection error. Please try again.";

/// Notification shown after a confirmed clear
const CLEAR_SUCCESS: &str = "Chat cleared successfully";

/// Controller configuration
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Opening bot message appended to an empty session at startup
    pub welcome_message: Option<String>,
    /// Delay before the staged carryover input is auto-sent
    pub carryover_delay: Duration,
    /// Delay before the crisis follow-up message is appended
    pub crisis_followup_delay: Duration,
    /// Settle delay before the scroll-to-bottom directive
    pub scroll_settle_delay: Duration,
    /// Maximum input surface height for the auto-grow clamp
    pub max_input_height: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            welcome_message: Some(
                "Hi, I'm here to listen. What's on your mind today?".to_string(),
            ),
            carryover_delay: Duration::from_millis(1000),
            crisis_followup_delay: Duration::from_millis(2000),
            scroll_settle_delay: Duration::from_millis(100),
            max_input_height: 120,
        }
    }
}

impl ControllerConfig {
    /// Create configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            welcome_message: std::env::var("SOLACE_WELCOME_MESSAGE")
                .map(|v| if v.is_empty() { None } else { Some(v) })
                .unwrap_or(default.welcome_message),
            carryover_delay: env_millis("SOLACE_CARRYOVER_DELAY_MS", default.carryover_delay),
            crisis_followup_delay: env_millis(
                "SOLACE_CRISIS_FOLLOWUP_DELAY_MS",
                default.crisis_followup_delay,
            ),
            scroll_settle_delay: env_millis(
                "SOLACE_SCROLL_SETTLE_DELAY_MS",
                default.scroll_settle_delay,
            ),
            max_input_height: std::env::var("SOLACE_MAX_INPUT_HEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_input_height),
        }
    }
}

fn env_millis(var: &str, fallback: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map_or(fallback, Duration::from_millis)
}

/// The Controller - headless conversation session core
pub struct Controller<R: Responder> {
    /// Configuration
    config: ControllerConfig,
    /// Responder service
    responder: Arc<R>,
    /// Current session
    session: Session,
    /// Current operational state
    state: ControllerState,
    /// Canonical input buffer, mirrored with the input surface
    input: String,
    /// Carryover staging slot
    carryover: CarryoverSlot,
    /// Scheduled follow-ups
    timers: Timers,
    /// Result channel for the in-flight exchange, if any
    pending_reply: Option<oneshot::Receiver<anyhow::Result<Reply>>>,
    /// Channel to send messages to the surface
    tx: mpsc::Sender<ControllerMessage>,
}

impl<R: Responder + 'static> Controller<R> {
    /// Create a new Controller with the given responder
    pub fn new(
        responder: R,
        config: ControllerConfig,
        carryover: CarryoverSlot,
        tx: mpsc::Sender<ControllerMessage>,
    ) -> Self {
        Self {
            config,
            responder: Arc::new(responder),
            session: Session::new(),
            state: ControllerState::Idle,
            input: String::new(),
            carryover,
            timers: Timers::new(),
            pending_reply: None,
            tx,
        }
    }

    /// Get the session ID
    pub fn session_id(&self) -> SessionId {
        self.session.id
    }

    /// Get current state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The session owned by this controller
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current content of the input buffer
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Start the Controller
    ///
    /// Health-checks the responder, announces state and session info,
    /// appends the welcome message to an empty transcript, and consumes
    /// the carryover slot (clearing it immediately, before the scheduled
    /// send runs).
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let ready = self.responder.health_check().await;
        if !ready {
            tracing::warn!(responder = self.responder.name(), "Responder not reachable");
            self.notify(
                NotifyLevel::Warning,
                "Having trouble reaching the service - your first message may fail",
            )
            .await;
        }

        self.send(ControllerMessage::State { state: self.state })
            .await;
        self.send(ControllerMessage::SessionInfo {
            session_id: self.session.id,
            ready,
        })
        .await;

        if self.session.is_empty() {
            if let Some(welcome) = self.config.welcome_message.clone() {
                self.append_bot_message(&welcome, None).await;
            }
        }

        if let Some(text) = self.carryover.take() {
            self.timers
                .schedule(self.config.carryover_delay, TimerFired::CarryoverSend { text });
        }

        Ok(())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        match event {
            SurfaceEvent::Connected { event_id } => {
                self.ack(event_id).await;
                // Bring a (re)connecting surface up to date
                self.send(ControllerMessage::State { state: self.state })
                    .await;
                self.send(ControllerMessage::Layout {
                    directive: LayoutDirective::FocusInput,
                })
                .await;
            }

            SurfaceEvent::Disconnected { event_id, .. } => {
                self.ack(event_id).await;
            }

            SurfaceEvent::InputChanged {
                content,
                content_height,
            } => {
                self.input = content;
                let height = content_height.min(self.config.max_input_height);
                self.send(ControllerMessage::Layout {
                    directive: LayoutDirective::ResizeInput { height },
                })
                .await;
            }

            SurfaceEvent::SubmitPressed {
                event_id,
                modifier_held,
            } => {
                self.ack(event_id).await;
                if modifier_held {
                    // Modifier-held submit inserts a literal line break and
                    // must not send.
                    self.input.push('\n');
                    self.send(ControllerMessage::SetInput {
                        content: self.input.clone(),
                    })
                    .await;
                } else {
                    self.send_message().await;
                }
            }

            SurfaceEvent::SendRequested { event_id } => {
                self.ack(event_id).await;
                self.send_message().await;
            }

            SurfaceEvent::ClearRequested {
                event_id,
                confirmed,
            } => {
                self.ack(event_id).await;
                if confirmed {
                    self.clear_conversation().await;
                }
            }

            SurfaceEvent::QuitRequested { event_id } => {
                self.ack(event_id).await;
                self.teardown().await;
            }
        }

        Ok(())
    }

    /// Send the current input buffer as a user message
    ///
    /// No-op unless the state is `Idle` and the trimmed buffer is
    /// non-empty. Issues exactly one responder request; the result arrives
    /// through [`Controller::poll_reply`].
    pub async fn send_message(&mut self) {
        if !self.state.accepts_send() {
            tracing::debug!(state = ?self.state, "Dropping send while not idle");
            return;
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.input.clear();
        self.send(ControllerMessage::ClearInput).await;

        self.append_user_message(&text).await;
        self.set_state(ControllerState::AwaitingReply).await;

        let responder = Arc::clone(&self.responder);
        let (result_tx, result_rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = responder.send(&ReplyRequest::new(text)).await;
            // Receiver gone means the session was torn down mid-flight.
            let _ = result_tx.send(result);
        });
        self.pending_reply = Some(result_rx);
    }

    /// Poll for the in-flight exchange result
    ///
    /// Call this regularly from the event loop. Returns true if a reply or
    /// failure was processed.
    pub async fn poll_reply(&mut self) -> bool {
        let Some(rx) = self.pending_reply.as_mut() else {
            return false;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(anyhow::anyhow!("responder task dropped without a result"))
            }
        };
        self.pending_reply = None;

        match result {
            Ok(reply) => {
                self.set_state(ControllerState::Idle).await;
                self.append_bot_message(&reply.text, reply.timestamp.clone())
                    .await;
                if reply.classification.is_crisis() {
                    self.escalate_crisis().await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Responder exchange failed");
                self.set_state(ControllerState::Failed).await;
                self.append_bot_message(FALLBACK_REPLY, None).await;
                self.notify(NotifyLevel::Warning, CONNECTION_WARNING).await;
                self.set_state(ControllerState::Idle).await;
            }
        }

        true
    }

    /// Poll for fired follow-up timers
    ///
    /// Returns true if any scheduled action ran.
    pub async fn poll_timers(&mut self) -> bool {
        let mut activity = false;
        while let Some(fired) = self.timers.try_recv() {
            activity = true;
            match fired {
                TimerFired::CarryoverSend { text } => {
                    self.input = text;
                    self.send(ControllerMessage::SetInput {
                        content: self.input.clone(),
                    })
                    .await;
                    self.send_message().await;
                }
                TimerFired::CrisisFollowUp => {
                    self.append_bot_message(CRISIS_FOLLOW_UP, None).await;
                }
                TimerFired::ScrollToBottom => {
                    self.send(ControllerMessage::Layout {
                        directive: LayoutDirective::ScrollToBottom,
                    })
                    .await;
                }
            }
        }
        activity
    }

    /// Tear down the session
    ///
    /// Cancels every scheduled follow-up so nothing acts on the torn-down
    /// session, forgets any in-flight exchange, and asks the surface to
    /// quit.
    pub async fn teardown(&mut self) {
        self.timers.cancel_all();
        self.pending_reply = None;
        self.send(ControllerMessage::Quit { message: None }).await;
    }

    /// Discard the transcript and restart it with the fixed opening message
    async fn clear_conversation(&mut self) {
        let rendered = formatter::format(CLEAR_GREETING);
        let timestamp = session::display_time_now();
        let id = self
            .session
            .reset(CLEAR_GREETING, rendered.clone(), timestamp.clone());

        self.send(ControllerMessage::TranscriptCleared).await;
        self.send(ControllerMessage::Message {
            id,
            role: MessageRole::Bot,
            content: CLEAR_GREETING.to_string(),
            rendered,
            timestamp,
        })
        .await;
        self.notify(NotifyLevel::Success, CLEAR_SUCCESS).await;
    }

    /// Run crisis escalation for the most recent bot message
    async fn escalate_crisis(&mut self) {
        if let Some(message_id) = self.session.flag_last_bot_message() {
            self.send(ControllerMessage::Emphasize { message_id }).await;
        }
        self.timers
            .schedule(self.config.crisis_followup_delay, TimerFired::CrisisFollowUp);
    }

    /// Append a user message and announce it to the surface
    async fn append_user_message(&mut self, text: &str) -> MessageId {
        let rendered = formatter::format(text);
        let timestamp = session::display_time_now();
        let id = self
            .session
            .add_user_message(text, rendered.clone(), timestamp.clone());
        self.send(ControllerMessage::Message {
            id: id.clone(),
            role: MessageRole::User,
            content: text.to_string(),
            rendered,
            timestamp,
        })
        .await;
        self.schedule_scroll();
        id
    }

    /// Append a bot message and announce it to the surface
    ///
    /// Falls back to the locally formatted current time when the service
    /// provided no timestamp.
    async fn append_bot_message(&mut self, text: &str, timestamp: Option<String>) -> MessageId {
        let rendered = formatter::format(text);
        let timestamp = timestamp.unwrap_or_else(session::display_time_now);
        let id = self
            .session
            .add_bot_message(text, rendered.clone(), timestamp.clone());
        self.send(ControllerMessage::Message {
            id: id.clone(),
            role: MessageRole::Bot,
            content: text.to_string(),
            rendered,
            timestamp,
        })
        .await;
        self.schedule_scroll();
        id
    }

    /// Schedule the scroll settle
    fn schedule_scroll(&mut self) {
        self.timers
            .schedule(self.config.scroll_settle_delay, TimerFired::ScrollToBottom);
    }

    /// Set state and notify the surface
    async fn set_state(&mut self, state: ControllerState) {
        self.state = state;
        self.send(ControllerMessage::State { state }).await;
    }

    /// Send acknowledgment
    async fn ack(&self, event_id: EventId) {
        self.send(ControllerMessage::Ack { event_id }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(ControllerMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the surface
    async fn send(&self, msg: ControllerMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::responder::Classification;

    // Mock responder for testing; behavior is selected per test.
    enum MockBehavior {
        Reply(Classification),
        Fail,
        Stall,
    }

    struct MockResponder {
        behavior: MockBehavior,
        calls: Arc<AtomicUsize>,
    }

    impl MockResponder {
        fn new(behavior: MockBehavior) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    behavior,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    #[async_trait::async_trait]
    impl Responder for MockResponder {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn send(&self, request: &ReplyRequest) -> anyhow::Result<Reply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                MockBehavior::Reply(classification) => Ok(Reply {
                    text: format!("You said: {}", request.message),
                    classification,
                    timestamp: Some("01:23 PM".to_string()),
                    mood_impact: None,
                }),
                MockBehavior::Fail => anyhow::bail!("connection refused"),
                MockBehavior::Stall => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    fn test_config() -> ControllerConfig {
        ControllerConfig {
            welcome_message: None,
            carryover_delay: Duration::from_millis(5),
            crisis_followup_delay: Duration::from_millis(5),
            scroll_settle_delay: Duration::from_millis(1),
            max_input_height: 120,
        }
    }

    fn controller_with(
        behavior: MockBehavior,
    ) -> (
        Controller<MockResponder>,
        mpsc::Receiver<ControllerMessage>,
        Arc<AtomicUsize>,
    ) {
        let (responder, calls) = MockResponder::new(behavior);
        let (tx, rx) = mpsc::channel(256);
        let controller = Controller::new(responder, test_config(), CarryoverSlot::new(), tx);
        (controller, rx, calls)
    }

    async fn await_reply(controller: &mut Controller<MockResponder>) {
        for _ in 0..100 {
            if controller.poll_reply().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("no reply processed");
    }

    fn drain(rx: &mut mpsc::Receiver<ControllerMessage>) -> Vec<ControllerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    async fn type_and_send(controller: &mut Controller<MockResponder>, text: &str) {
        controller
            .handle_event(SurfaceEvent::InputChanged {
                content: text.to_string(),
                content_height: 24,
            })
            .await
            .unwrap();
        controller.send_message().await;
    }

    #[tokio::test]
    async fn test_whitespace_send_is_noop() {
        let (mut controller, _rx, calls) =
            controller_with(MockBehavior::Reply(Classification::Normal));

        type_and_send(&mut controller, "   \n  ").await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(controller.session().is_empty());
        assert_eq!(controller.state(), ControllerState::Idle);
        // The rejected input is left in place
        assert_eq!(controller.input(), "   \n  ");
    }

    #[tokio::test]
    async fn test_send_appends_user_then_bot() {
        let (mut controller, mut rx, calls) =
            controller_with(MockBehavior::Reply(Classification::Normal));

        type_and_send(&mut controller, "  hello  ").await;
        assert_eq!(controller.state(), ControllerState::AwaitingReply);
        assert_eq!(controller.input(), "");

        await_reply(&mut controller).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state(), ControllerState::Idle);

        let messages = controller.session().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, MessageRole::Bot);
        assert_eq!(messages[1].content, "You said: hello");
        // Service timestamp is used as-is
        assert_eq!(messages[1].timestamp, "01:23 PM");

        let sent = drain(&mut rx);
        assert!(sent
            .iter()
            .any(|m| matches!(m, ControllerMessage::ClearInput)));
    }

    #[tokio::test]
    async fn test_second_send_while_awaiting_is_noop() {
        let (mut controller, _rx, calls) = controller_with(MockBehavior::Stall);

        type_and_send(&mut controller, "first").await;
        assert_eq!(controller.state(), ControllerState::AwaitingReply);

        type_and_send(&mut controller, "second").await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let messages = controller.session().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "first");
    }

    #[tokio::test]
    async fn test_failure_appends_fallback_and_warns() {
        let (mut controller, mut rx, _calls) = controller_with(MockBehavior::Fail);

        type_and_send(&mut controller, "hello").await;
        await_reply(&mut controller).await;

        assert_eq!(controller.state(), ControllerState::Idle);
        let messages = controller.session().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, MessageRole::Bot);
        assert_eq!(messages[1].content, FALLBACK_REPLY);

        let sent = drain(&mut rx);
        assert!(sent.iter().any(|m| matches!(
            m,
            ControllerMessage::Notify {
                level: NotifyLevel::Warning,
                ..
            }
        )));
        // The transient Failed state was reported before returning to Idle
        assert!(sent.iter().any(|m| matches!(
            m,
            ControllerMessage::State {
                state: ControllerState::Failed
            }
        )));
    }

    #[tokio::test]
    async fn test_crisis_flags_reply_and_appends_followup() {
        let (mut controller, mut rx, _calls) =
            controller_with(MockBehavior::Reply(Classification::Crisis));

        type_and_send(&mut controller, "I need help").await;
        await_reply(&mut controller).await;

        let messages = controller.session().messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].flagged);

        let sent = drain(&mut rx);
        assert!(sent
            .iter()
            .any(|m| matches!(m, ControllerMessage::Emphasize { .. })));

        // The follow-up lands after the configured delay
        tokio::time::sleep(Duration::from_millis(30)).await;
        controller.poll_timers().await;

        let messages = controller.session().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, MessageRole::Bot);
        assert_eq!(messages[2].content, CRISIS_FOLLOW_UP);
        assert!(!messages[2].flagged);
    }

    #[tokio::test]
    async fn test_normal_reply_has_no_followup() {
        let (mut controller, _rx, _calls) =
            controller_with(MockBehavior::Reply(Classification::Normal));

        type_and_send(&mut controller, "hello").await;
        await_reply(&mut controller).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        controller.poll_timers().await;

        assert_eq!(controller.session().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let (mut controller, mut rx, _calls) =
            controller_with(MockBehavior::Reply(Classification::Normal));

        type_and_send(&mut controller, "hello").await;
        await_reply(&mut controller).await;
        assert_eq!(controller.session().len(), 2);
        drain(&mut rx);

        controller
            .handle_event(SurfaceEvent::ClearRequested {
                event_id: SurfaceEvent::new_event_id(),
                confirmed: false,
            })
            .await
            .unwrap();
        assert_eq!(controller.session().len(), 2);

        controller
            .handle_event(SurfaceEvent::ClearRequested {
                event_id: SurfaceEvent::new_event_id(),
                confirmed: true,
            })
            .await
            .unwrap();

        let messages = controller.session().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, CLEAR_GREETING);

        let sent = drain(&mut rx);
        assert!(sent
            .iter()
            .any(|m| matches!(m, ControllerMessage::TranscriptCleared)));
        assert!(sent.iter().any(|m| matches!(
            m,
            ControllerMessage::Notify {
                level: NotifyLevel::Success,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_submit_with_modifier_inserts_line_break() {
        let (mut controller, mut rx, calls) =
            controller_with(MockBehavior::Reply(Classification::Normal));

        controller
            .handle_event(SurfaceEvent::InputChanged {
                content: "line one".to_string(),
                content_height: 24,
            })
            .await
            .unwrap();
        controller
            .handle_event(SurfaceEvent::SubmitPressed {
                event_id: SurfaceEvent::new_event_id(),
                modifier_held: true,
            })
            .await
            .unwrap();

        assert_eq!(controller.input(), "line one\n");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let sent = drain(&mut rx);
        assert!(sent.iter().any(|m| matches!(
            m,
            ControllerMessage::SetInput { content } if content == "line one\n"
        )));
    }

    #[tokio::test]
    async fn test_submit_without_modifier_sends() {
        let (mut controller, _rx, calls) =
            controller_with(MockBehavior::Reply(Classification::Normal));

        controller
            .handle_event(SurfaceEvent::InputChanged {
                content: "hello".to_string(),
                content_height: 24,
            })
            .await
            .unwrap();
        controller
            .handle_event(SurfaceEvent::SubmitPressed {
                event_id: SurfaceEvent::new_event_id(),
                modifier_held: false,
            })
            .await
            .unwrap();

        await_reply(&mut controller).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_input_height_is_clamped() {
        let (mut controller, mut rx, _calls) =
            controller_with(MockBehavior::Reply(Classification::Normal));

        controller
            .handle_event(SurfaceEvent::InputChanged {
                content: "lots of text".to_string(),
                content_height: 400,
            })
            .await
            .unwrap();

        let sent = drain(&mut rx);
        assert!(sent.iter().any(|m| matches!(
            m,
            ControllerMessage::Layout {
                directive: LayoutDirective::ResizeInput { height: 120 }
            }
        )));
    }

    #[tokio::test]
    async fn test_rendered_content_is_escaped() {
        let (mut controller, _rx, _calls) =
            controller_with(MockBehavior::Reply(Classification::Normal));

        type_and_send(&mut controller, "<b>bold</b>").await;

        let user = &controller.session().messages()[0];
        assert_eq!(user.content, "<b>bold</b>");
        assert_eq!(user.rendered, "&lt;b&gt;bold&lt;/b&gt;");
    }

    #[tokio::test]
    async fn test_teardown_cancels_pending_followups() {
        let (mut controller, _rx, _calls) =
            controller_with(MockBehavior::Reply(Classification::Crisis));

        type_and_send(&mut controller, "I need help").await;
        await_reply(&mut controller).await;
        assert_eq!(controller.session().len(), 2);

        controller.teardown().await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        controller.poll_timers().await;
        // The crisis follow-up never lands
        assert_eq!(controller.session().len(), 2);
    }
}
