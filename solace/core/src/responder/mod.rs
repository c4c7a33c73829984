//! Responder Service Integration
//!
//! This module provides abstracted access to the remote responder service
//! (the collaborator that computes replies and crisis classification)
//! through a common trait interface.
//!
//! # Usage
//!
//! ```ignore
//! use solace_core::responder::{HttpResponder, Responder, ReplyRequest};
//!
//! let responder = HttpResponder::from_env();
//! let reply = responder.send(&ReplyRequest::new("hello")).await?;
//! ```

mod http;
mod traits;

pub use http::{HttpResponder, DEFAULT_ENDPOINT};
pub use traits::{Classification, Reply, ReplyRequest, Responder};
