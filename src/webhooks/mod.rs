//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Typed events and the payload parser
//! - The static event router

pub mod events;
pub mod parser;
pub mod router;
pub mod signature;

pub use events::{GitHubEvent, PullRequestEvent, PullRequestReviewEvent};
pub use parser::{ParseError, parse_webhook};
pub use router::{HandlerKind, route};
pub use signature::{SignatureError, WebhookSecret};
