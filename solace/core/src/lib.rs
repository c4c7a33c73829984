//! Solace Core - Headless Conversation Session Core
//!
//! This crate provides the session logic behind the solace support-chat
//! widget, completely independent of any UI framework. It can drive a web
//! widget, a TUI, or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      UI Surfaces                         │
//! │   ┌───────────┐  ┌───────────┐  ┌────────────────────┐  │
//! │   │ Web page  │  │    TUI    │  │  Headless / tests  │  │
//! │   └─────┬─────┘  └─────┬─────┘  └─────────┬──────────┘  │
//! │         └──────────────┴──────────────────┘             │
//! │                        │                                │
//! │                 SurfaceEvent (up)                       │
//! │              ControllerMessage (down)                   │
//! │                        │                                │
//! └────────────────────────┼────────────────────────────────┘
//!                          │
//! ┌────────────────────────┼────────────────────────────────┐
//! │                  SESSION CORE                           │
//! │  ┌─────────────────────┴─────────────────────────────┐  │
//! │  │                  Controller                        │  │
//! │  │  ┌─────────┐ ┌───────────┐ ┌────────┐ ┌─────────┐ │  │
//! │  │  │ Session │ │ Formatter │ │ Timers │ │Responder│ │  │
//! │  │  └─────────┘ └───────────┘ └────────┘ └─────────┘ │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Controller`]: the state machine that owns one conversation session
//! - [`ControllerMessage`]: messages sent from the Controller to surfaces
//! - [`SurfaceEvent`]: events sent from surfaces to the Controller
//! - [`Session`]: the append-only transcript with metadata
//! - [`Responder`]: the seam to the remote reply service
//! - [`CarryoverSlot`]: the consume-once quick-start staging area
//!
//! # Quick Start
//!
//! ```ignore
//! use solace_core::{
//!     Controller, ControllerConfig, CarryoverSlot,
//!     events::SurfaceEvent,
//!     responder::HttpResponder,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let responder = HttpResponder::from_env();
//!     let carryover = CarryoverSlot::new();
//!     let mut controller =
//!         Controller::new(responder, ControllerConfig::from_env(), carryover, tx);
//!
//!     controller.start().await.unwrap();
//!
//!     loop {
//!         // Render messages from the Controller
//!         while let Ok(msg) = rx.try_recv() {
//!             // ...
//!         }
//!
//!         // Observe the in-flight exchange and scheduled follow-ups
//!         controller.poll_reply().await;
//!         controller.poll_timers().await;
//!
//!         // Translate user actions into SurfaceEvents and dispatch them
//!         // via controller.handle_event(...)
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`carryover`]: consume-once staging slot for a quick-start prompt
//! - [`config`]: layered TOML/env configuration loading
//! - [`controller`]: the conversation session controller
//! - [`events`]: events from surfaces to the Controller
//! - [`formatter`]: text-to-safe-markup transform
//! - [`messages`]: messages from the Controller to surfaces
//! - [`responder`]: responder service abstraction (HTTP, mocks)
//! - [`session`]: transcript and session state
//! - [`timers`]: cancellable scheduled follow-ups
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on any UI framework. It's pure
//! session logic that can be embedded anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod carryover;
pub mod config;
pub mod controller;
pub mod events;
pub mod formatter;
pub mod messages;
pub mod responder;
pub mod session;
pub mod timers;

// Re-exports for convenience
pub use carryover::CarryoverSlot;
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, LoadedConfig, SolaceToml,
};
pub use controller::{
    Controller, ControllerConfig, CLEAR_GREETING, CRISIS_FOLLOW_UP, FALLBACK_REPLY,
};
pub use events::SurfaceEvent;
pub use messages::{
    ControllerMessage, ControllerState, EventId, LayoutDirective, MessageId, MessageRole,
    NotifyLevel, SessionId,
};
pub use responder::{Classification, HttpResponder, Reply, ReplyRequest, Responder};
pub use session::{Session, SessionMetadata, TranscriptMessage};
pub use timers::{TimerFired, TimerSlot, Timers};
