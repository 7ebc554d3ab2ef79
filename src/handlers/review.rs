//! Handler for `pull_request_review` submissions.
//!
//! | Review | Effect |
//! |--------|--------|
//! | `changes_requested` | add `changes requested`, drop `awaiting review` |
//! | `approved` | drop `changes requested` and `awaiting review` |
//! | anything else | none |
//!
//! Reviews from authors without write access never change labels.

use std::fmt;

use tracing::info;

use super::{HandlerError, add_label, is_settled, remove_label};
use crate::effects::{EffectExecutor, GitHubEffect, GitHubInterpreter};
use crate::types::Label;
use crate::webhooks::events::{PullRequestReviewEvent, ReviewAction, ReviewState};

/// Label changes for a review event.
pub fn review_effects(event: &PullRequestReviewEvent) -> Vec<GitHubEffect> {
    let pr = &event.pr;
    if event.action != ReviewAction::Submitted
        || is_settled(pr)
        || !event.review.author_association.is_privileged()
    {
        return Vec::new();
    }

    let labels = &pr.labels;
    let mut effects = Vec::new();
    match event.review.state {
        ReviewState::ChangesRequested => {
            if !labels.contains(Label::ChangesRequested) {
                effects.push(add_label(pr, Label::ChangesRequested));
                if labels.contains(Label::AwaitingReview) {
                    effects.push(remove_label(pr, Label::AwaitingReview));
                }
            }
        }
        ReviewState::Approved => {
            if labels.contains(Label::ChangesRequested) {
                effects.push(remove_label(pr, Label::ChangesRequested));
            }
            if labels.contains(Label::AwaitingReview) {
                effects.push(remove_label(pr, Label::AwaitingReview));
            }
        }
        ReviewState::Commented | ReviewState::Dismissed | ReviewState::Pending => {}
    }
    effects
}

pub async fn run<G>(
    event: &PullRequestReviewEvent,
    executor: &EffectExecutor<G>,
) -> Result<(), HandlerError>
where
    G: GitHubInterpreter,
    G::Error: fmt::Display,
{
    info!(
        pr = %event.pr.number,
        state = ?event.review.state,
        reviewer = %event.review.reviewer_login,
        repo = %event.repo,
        "Handling review"
    );

    let effects = review_effects(event);
    if !effects.is_empty() {
        info!(pr = %event.pr.number, count = effects.len(), "Updating review labels");
    }
    executor.run_all(effects).await?;
    Ok(())
}
