//! Flags failing checks when a draft is marked ready for review.

use std::fmt;

use tracing::info;

use super::{HandlerError, add_label, is_settled};
use crate::effects::{CheckRun, EffectExecutor, GitHubEffect, GitHubInterpreter};
use crate::types::{Label, PrSnapshot};
use crate::webhooks::events::PullRequestEvent;

/// Adds `tests are failing` when any run failed. Never removes it.
pub fn failing_check_effects(pr: &PrSnapshot, runs: &[CheckRun]) -> Vec<GitHubEffect> {
    if runs.iter().any(CheckRun::is_failure) && !pr.labels.contains(Label::FailedTest) {
        vec![add_label(pr, Label::FailedTest)]
    } else {
        Vec::new()
    }
}

pub async fn run<G>(
    event: &PullRequestEvent,
    executor: &EffectExecutor<G>,
) -> Result<(), HandlerError>
where
    G: GitHubInterpreter,
    G::Error: fmt::Display,
{
    let pr = &event.pr;
    if is_settled(pr) {
        return Ok(());
    }
    info!(pr = %pr.number, sha = pr.head_sha.short(), repo = %event.repo, "Checking CI results");

    let runs = executor.check_runs(&pr.head_sha).await?;
    let effects = failing_check_effects(pr, &runs);
    if !effects.is_empty() {
        info!(pr = %pr.number, "Adding {}", Label::FailedTest);
    }
    executor.run_all(effects).await?;
    Ok(())
}
