//! Session Management
//!
//! A session owns the transcript of one conversation: an ordered,
//! append-only sequence of messages exchanged between the user and the
//! responder. The session lives as long as the widget page; there is no
//! persistence.
//!
//! Every entry stores both the raw content and the formatter-derived
//! `rendered` markup. The raw content is never handed to a surface for
//! direct markup insertion.

use serde::{Deserialize, Serialize};

use crate::messages::{MessageId, MessageRole, SessionId};

/// Current Unix timestamp in milliseconds
fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Display-formatted current local time, e.g. "03:42 PM".
///
/// Used when a reply carries no service timestamp, and for locally
/// synthesized messages.
#[must_use]
pub fn display_time_now() -> String {
    chrono::Local::now().format("%I:%M %p").to_string()
}

/// One entry in the transcript
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Raw content as entered or received
    pub content: String,
    /// Sanitized/linkified markup derived from `content`
    pub rendered: String,
    /// Display-formatted timestamp
    pub timestamp: String,
    /// Whether the message is marked as requiring attention
    pub flagged: bool,
}

impl TranscriptMessage {
    /// Create a new transcript entry
    pub fn new(
        role: MessageRole,
        content: impl Into<String>,
        rendered: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            rendered: rendered.into(),
            timestamp: timestamp.into(),
            flagged: false,
        }
    }
}

/// Session metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// When the session was created (Unix timestamp ms)
    pub created_at: u64,
    /// When the session was last active (Unix timestamp ms)
    pub last_active_at: u64,
    /// Total messages exchanged
    pub message_count: u32,
}

impl SessionMetadata {
    /// Create new metadata
    pub fn new() -> Self {
        let now = now_ms();
        Self {
            created_at: now,
            last_active_at: now,
            message_count: 0,
        }
    }

    /// Update last active timestamp
    pub fn touch(&mut self) {
        self.last_active_at = now_ms();
    }

    /// Increment message count
    pub fn add_message(&mut self) {
        self.message_count += 1;
        self.touch();
    }
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A conversation session
///
/// Mutation is push-only: entries are appended, the most recent bot entry
/// can be flagged, and `reset` replaces the whole transcript for the clear
/// operation. Nothing else edits history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID
    pub id: SessionId,
    /// Session metadata
    pub metadata: SessionMetadata,
    /// Transcript entries, oldest first
    messages: Vec<TranscriptMessage>,
}

impl Session {
    /// Create a new, empty session
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            metadata: SessionMetadata::new(),
            messages: Vec::new(),
        }
    }

    /// Append a user message, returning its ID
    pub fn add_user_message(
        &mut self,
        content: impl Into<String>,
        rendered: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> MessageId {
        self.push(TranscriptMessage::new(
            MessageRole::User,
            content,
            rendered,
            timestamp,
        ))
    }

    /// Append a bot message, returning its ID
    pub fn add_bot_message(
        &mut self,
        content: impl Into<String>,
        rendered: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> MessageId {
        self.push(TranscriptMessage::new(
            MessageRole::Bot,
            content,
            rendered,
            timestamp,
        ))
    }

    fn push(&mut self, msg: TranscriptMessage) -> MessageId {
        let id = msg.id.clone();
        self.messages.push(msg);
        self.metadata.add_message();
        id
    }

    /// Flag the most recently appended bot message as requiring attention.
    ///
    /// Returns the flagged message's ID, or `None` if the transcript holds
    /// no bot message yet.
    pub fn flag_last_bot_message(&mut self) -> Option<MessageId> {
        let msg = self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.role == MessageRole::Bot)?;
        msg.flagged = true;
        Some(msg.id.clone())
    }

    /// Discard the transcript and restart it with a single bot message.
    ///
    /// Returns the ID of the new opening message.
    pub fn reset(
        &mut self,
        content: impl Into<String>,
        rendered: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> MessageId {
        self.messages.clear();
        self.metadata.touch();
        self.push(TranscriptMessage::new(
            MessageRole::Bot,
            content,
            rendered,
            timestamp,
        ))
    }

    /// Transcript entries, oldest first
    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    /// Number of transcript entries
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent transcript entry, if any
    pub fn last_message(&self) -> Option<&TranscriptMessage> {
        self.messages.last()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
