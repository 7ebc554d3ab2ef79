//! Effect execution with typed responses.
//!
//! [`EffectExecutor`] wraps a [`GitHubInterpreter`] and gives handlers one
//! typed method per read collaborator, plus [`EffectExecutor::run_all`] for
//! applying a list of write effects in order.
//!
//! Each effect is awaited before the next one starts. A failed effect aborts
//! the remaining list; the webhook redelivery then converges on the same end
//! state because every handler re-derives its effects from fresh labels.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use super::github::{CheckRun, FileChange, GitHubEffect, GitHubResponse, OpenPrSearch};
use super::interpreter::GitHubInterpreter;
use crate::types::{PrNumber, Sha};

/// Errors from effect execution.
#[derive(Debug, Error)]
pub enum EffectError {
    /// The interpreter failed to execute the effect.
    #[error("GitHub {operation} failed: {message}")]
    GitHub {
        operation: &'static str,
        message: String,
    },

    /// The interpreter answered with a response for a different effect.
    #[error("unexpected response to {operation}: {response}")]
    UnexpectedResponse {
        operation: &'static str,
        response: String,
    },
}

/// Executes effects through an interpreter.
pub struct EffectExecutor<G> {
    github: G,
}

impl<G> EffectExecutor<G>
where
    G: GitHubInterpreter,
    G::Error: fmt::Display,
{
    pub fn new(github: G) -> Self {
        EffectExecutor { github }
    }

    /// Returns the wrapped interpreter.
    pub fn github(&self) -> &G {
        &self.github
    }

    /// Executes a single effect.
    pub async fn execute(&self, effect: GitHubEffect) -> Result<GitHubResponse, EffectError> {
        let operation = effect.name();
        debug!(?effect, "Executing GitHub effect");

        self.github.interpret(effect).await.map_err(|e| {
            warn!(operation, error = %e, "GitHub effect failed");
            EffectError::GitHub {
                operation,
                message: e.to_string(),
            }
        })
    }

    /// Executes effects in order, stopping at the first failure.
    pub async fn run_all(&self, effects: Vec<GitHubEffect>) -> Result<(), EffectError> {
        for effect in effects {
            self.execute(effect).await?;
        }
        Ok(())
    }

    pub async fn changed_files(&self, pr: PrNumber) -> Result<Vec<FileChange>, EffectError> {
        match self.execute(GitHubEffect::ListChangedFiles { pr }).await? {
            GitHubResponse::ChangedFiles(files) => Ok(files),
            other => Err(unexpected("list_changed_files", other)),
        }
    }

    pub async fn file_content(&self, path: &str, reference: &Sha) -> Result<String, EffectError> {
        let effect = GitHubEffect::GetFileContent {
            path: path.to_string(),
            reference: reference.clone(),
        };
        match self.execute(effect).await? {
            GitHubResponse::FileContent(text) => Ok(text),
            other => Err(unexpected("get_file_content", other)),
        }
    }

    pub async fn open_prs(&self, author: &str) -> Result<OpenPrSearch, EffectError> {
        let effect = GitHubEffect::SearchOpenPrs {
            author: author.to_string(),
        };
        match self.execute(effect).await? {
            GitHubResponse::OpenPrs(search) => Ok(search),
            other => Err(unexpected("search_open_prs", other)),
        }
    }

    pub async fn check_runs(&self, sha: &Sha) -> Result<Vec<CheckRun>, EffectError> {
        match self
            .execute(GitHubEffect::ListCheckRuns { sha: sha.clone() })
            .await?
        {
            GitHubResponse::CheckRuns(runs) => Ok(runs),
            other => Err(unexpected("list_check_runs", other)),
        }
    }
}

fn unexpected(operation: &'static str, response: GitHubResponse) -> EffectError {
    EffectError::UnexpectedResponse {
        operation,
        response: format!("{:?}", response),
    }
}
