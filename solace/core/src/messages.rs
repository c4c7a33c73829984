//! Controller Messages
//!
//! Messages sent from the Controller to UI surfaces. These represent all the
//! ways the session core can communicate with whatever is rendering the
//! conversation (a web widget, a TUI, a test harness).
//!
//! # Design Philosophy
//!
//! The Controller is the "brain" of the widget: it owns the transcript, the
//! input lifecycle, and the exchange with the responder service. Surfaces are
//! pure renderers that display what the Controller tells them to. This
//! separation enables:
//!
//! - Hot-swappable surfaces (the same core drives a page widget or a test)
//! - Headless operation for testing and automation
//! - A state machine with no UI callback shapes in it

use serde::{Deserialize, Serialize};

/// Messages from Controller to UI surface
///
/// These messages tell the surface what to display and how to behave.
/// The surface should not have any conversation logic, just render.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ControllerMessage {
    // ============================================
    // Transcript Messages
    // ============================================
    /// A transcript entry to display
    Message {
        /// Unique message ID for tracking
        id: MessageId,
        /// Who sent this message
        role: MessageRole,
        /// Raw message content (never insert this as markup)
        content: String,
        /// Formatter-derived markup, safe to insert
        rendered: String,
        /// Display-formatted timestamp
        timestamp: String,
    },

    /// Mark an already-displayed message as requiring attention
    Emphasize {
        /// The message to emphasize
        message_id: MessageId,
    },

    /// The transcript was discarded and restarted
    TranscriptCleared,

    // ============================================
    // Input Directives
    // ============================================
    /// Replace the input surface content
    SetInput {
        /// New input content
        content: String,
    },

    /// Clear the input surface
    ClearInput,

    // ============================================
    // Layout Directives
    // ============================================
    /// Layout hint for surface organization
    Layout {
        /// The layout directive to apply
        directive: LayoutDirective,
    },

    // ============================================
    // System Messages
    // ============================================
    /// Transient, self-dismissing notification
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Message content
        message: String,
    },

    /// Controller state change
    State {
        /// The new state
        state: ControllerState,
    },

    /// Session information
    SessionInfo {
        /// Session ID
        session_id: SessionId,
        /// Whether the responder service was reachable at startup
        ready: bool,
    },

    /// Acknowledgment of a received event
    Ack {
        /// Event ID being acknowledged
        event_id: EventId,
    },

    /// Request surface to quit
    Quit {
        /// Optional goodbye message
        message: Option<String>,
    },
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Event identifier (for acks)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Session identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    /// Generate a new unique session ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who sent a transcript message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input
    User,
    /// Responder reply (or a locally synthesized stand-in)
    Bot,
}

/// Layout directives for controlling surface organization
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LayoutDirective {
    /// Resize the input surface to the given height
    ResizeInput {
        /// Height in surface units, already clamped by the controller
        height: u32,
    },
    /// Scroll the transcript to its end
    ScrollToBottom,
    /// Focus the input field
    FocusInput,
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

/// Controller operational states
///
/// `Failed` is transient: it is entered and reported when an exchange fails,
/// and the controller immediately returns to `Idle` afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    /// Ready for input
    Idle,
    /// A user message was sent, reply not yet received
    AwaitingReply,
    /// The last exchange failed (transient, re-enters Idle)
    Failed,
}

impl ControllerState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::AwaitingReply => "Waiting for reply...",
            Self::Failed => "Connection trouble",
        }
    }

    /// Whether a new exchange may start in this state
    #[must_use]
    pub fn accepts_send(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
