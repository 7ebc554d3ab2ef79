//! Effect interpreter trait.
//!
//! The trait-based design enables:
//! - Mock interpreters for testing
//! - The octocrab-backed interpreter in production

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct CannedGitHub {
///     files: Vec<FileChange>,
/// }
///
/// impl GitHubInterpreter for CannedGitHub {
///     type Error = String;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         match effect {
///             GitHubEffect::ListChangedFiles { .. } => {
///                 Ok(GitHubResponse::ChangedFiles(self.files.clone()))
///             }
///             other => Err(format!("unexpected effect: {:?}", other)),
///         }
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}
