//! Surface Events
//!
//! Events sent from UI surfaces to the Controller. These represent all the
//! ways a surface can report user actions into the session core.
//!
//! # Design Philosophy
//!
//! Surfaces are "dumb" renderers that forward user actions to the Controller.
//! They don't interpret what actions mean, they just report what happened.
//! Raw keyboard and click handlers are translated at the surface edge into
//! the semantic events below, so the Controller's state machine never sees a
//! UI-framework callback shape.

use serde::{Deserialize, Serialize};

use crate::messages::EventId;

/// Events from UI surface to Controller
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Connection Events
    // ============================================
    /// Surface connected to the Controller
    Connected {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    /// Surface disconnecting gracefully
    Disconnected {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Reason for disconnect (optional)
        reason: Option<String>,
    },

    // ============================================
    // User Input Events
    // ============================================
    /// The input surface content changed
    ///
    /// Keeps the Controller's input buffer mirrored with the surface and
    /// drives the auto-growing input height.
    InputChanged {
        /// Current input content
        content: String,
        /// Measured content height in surface units (unclamped)
        content_height: u32,
    },

    /// The primary submission key was pressed
    SubmitPressed {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Whether the line-break modifier was held
        modifier_held: bool,
    },

    /// The send control was activated (button click, tap)
    SendRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    /// User asked to clear the conversation
    ///
    /// The blocking yes/no dialog is a surface concern; only its outcome is
    /// reported here. `confirmed == false` is a no-op for the Controller.
    ClearRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Whether the user confirmed the clear
        confirmed: bool,
    },

    // ============================================
    // Lifecycle Events
    // ============================================
    /// User requested quit
    QuitRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },
}

impl SurfaceEvent {
    /// Generate a new event ID for this event
    pub fn new_event_id() -> EventId {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        EventId(format!("evt_{id}"))
    }

    /// Get the event ID if this event has one
    pub fn event_id(&self) -> Option<&EventId> {
        match self {
            Self::Connected { event_id, .. }
            | Self::Disconnected { event_id, .. }
            | Self::SubmitPressed { event_id, .. }
            | Self::SendRequested { event_id, .. }
            | Self::ClearRequested { event_id, .. }
            | Self::QuitRequested { event_id, .. } => Some(event_id),
            Self::InputChanged { .. } => None,
        }
    }
}
