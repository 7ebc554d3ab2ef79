//! Effects-as-data for GitHub operations.
//!
//! This module defines effect types that describe operations without executing them.
//! This enables:
//! - Pure decision logic that returns effects as data
//! - Testability via mock interpreters
//! - Logging of intended operations

pub mod executor;
pub mod github;
pub mod interpreter;

pub use executor::{EffectError, EffectExecutor};
pub use github::{
    CheckRun, FileChange, FileStatus, GitHubEffect, GitHubResponse, OpenPrSearch,
};
pub use interpreter::GitHubInterpreter;
