//! GitHub API client and effect interpreter.
//!
//! This module executes [`GitHubEffect`](crate::effects::GitHubEffect)s via
//! octocrab. Errors are classified as transient or permanent for logging;
//! retrying is left to GitHub's webhook redelivery.

mod client;
mod error;
mod interpreter;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::interpret_github_effect;
