//! PR Gatekeeper - a GitHub bot that gates pull requests on description
//! shape, contributor limits and source compliance, and keeps review labels
//! in sync.
//!
//! Webhook deliveries are parsed into typed events, routed through a static
//! table, and handled by pure decision functions whose GitHub calls are
//! expressed as effects.

pub mod comments;
pub mod compliance;
pub mod config;
pub mod effects;
pub mod github;
pub mod handlers;
pub mod reconcile;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
