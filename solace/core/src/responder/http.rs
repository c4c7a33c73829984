//! HTTP Responder Implementation
//!
//! Production responder speaking the chat service's JSON wire format:
//! a POST with one `message` field, answered by a `response` text, an
//! `intent` classification tag, an optional display-ready `timestamp`,
//! and an optional `mood_impact` hint.
//!
//! Non-2xx statuses and transport errors are the only failure condition
//! the Controller distinguishes; error bodies are not parsed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{Classification, Reply, ReplyRequest, Responder};

/// Default endpoint when no configuration is present
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/chat";

/// HTTP responder client
#[derive(Clone)]
pub struct HttpResponder {
    /// Chat endpoint URL
    endpoint: String,
    /// HTTP client
    http_client: reqwest::Client,
}

/// Wire reply body
#[derive(Deserialize)]
struct WireReply {
    response: String,
    #[serde(default)]
    intent: Classification,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    mood_impact: Option<i32>,
}

impl HttpResponder {
    /// Create a new HTTP responder for the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let endpoint =
            std::env::var("SOLACE_CHAT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint)
    }

    /// The configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpResponder {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl Responder for HttpResponder {
    fn name(&self) -> &'static str {
        "Http"
    }

    async fn health_check(&self) -> bool {
        // Any HTTP response counts as reachable; the chat endpoint itself
        // may well answer GET with 405.
        self.http_client
            .get(&self.endpoint)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }

    async fn send(&self, request: &ReplyRequest) -> anyhow::Result<Reply> {
        let body = serde_json::json!({
            "message": request.message,
        });

        let wire: WireReply = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Reply {
            text: wire.response,
            classification: wire.intent,
            timestamp: wire.timestamp,
            mood_impact: wire.mood_impact,
        })
    }
}
