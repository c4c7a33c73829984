//! Responder Traits
//!
//! Trait definitions for the responder service seam. This abstraction lets
//! the Controller work with the production HTTP service, or with mock
//! responders in tests, without changing core logic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A request to the responder service
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplyRequest {
    /// The trimmed user message
    pub message: String,
}

impl ReplyRequest {
    /// Create a new request
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Classification accompanying a reply
///
/// Closed set: anything the wire carries beyond the two known tags
/// deserializes to `Unknown`, which the Controller handles exactly like
/// `Normal`. Rendering is never blocked by an unrecognized tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// An ordinary reply
    Normal,
    /// A reply requiring urgent escalation
    Crisis,
    /// An unrecognized tag, handled as `Normal`
    #[default]
    #[serde(other)]
    Unknown,
}

impl Classification {
    /// Parse a classification tag from a string
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "normal" => Self::Normal,
            "crisis" => Self::Crisis,
            _ => Self::Unknown,
        }
    }

    /// Whether this reply triggers crisis escalation
    #[must_use]
    pub fn is_crisis(&self) -> bool {
        matches!(self, Self::Crisis)
    }
}

/// A reply from the responder service
#[derive(Clone, Debug)]
pub struct Reply {
    /// The reply text
    pub text: String,
    /// Classification of the reply
    pub classification: Classification,
    /// Display-ready timestamp, if the service provided one
    pub timestamp: Option<String>,
    /// Mood hint accompanying the reply, carried opaquely for surfaces
    /// that track mood
    pub mood_impact: Option<i32>,
}

impl Reply {
    /// Create a normal reply with the given text (mostly for tests)
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            classification: Classification::Normal,
            timestamp: None,
            mood_impact: None,
        }
    }

    /// Create a crisis-classified reply with the given text
    pub fn crisis(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            classification: Classification::Crisis,
            timestamp: None,
            mood_impact: None,
        }
    }
}

/// The responder service seam
///
/// One request per user action; the Controller never retries. Transport
/// failure and non-success status are the single error category, folded
/// into `anyhow::Error`.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Responder name for logging
    fn name(&self) -> &str;

    /// Check if the service is reachable
    async fn health_check(&self) -> bool;

    /// Request a reply for one user message
    async fn send(&self, request: &ReplyRequest) -> anyhow::Result<Reply>;
}
