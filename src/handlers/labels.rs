//! Keeps `awaiting review` consistent after someone edits labels by hand.
//!
//! The snapshot in a `labeled` / `unlabeled` payload already reflects the
//! change, so the decision is taken from it directly.

use std::fmt;

use tracing::info;

use super::{HandlerError, add_label, is_settled, remove_label};
use crate::effects::{EffectExecutor, GitHubEffect, GitHubInterpreter};
use crate::types::Label;
use crate::webhooks::events::{PrAction, PullRequestEvent};

/// Label changes for a manual `labeled` or `unlabeled` event.
pub fn manual_label_effects(event: &PullRequestEvent) -> Vec<GitHubEffect> {
    let pr = &event.pr;
    if is_settled(pr) {
        return Vec::new();
    }
    // Labels this bot does not own are none of its business.
    let Some(changed) = event.label.as_deref().and_then(Label::from_name) else {
        return Vec::new();
    };

    match event.action {
        PrAction::Labeled if changed.blocks_review() => {
            if pr.labels.contains(Label::AwaitingReview) {
                return vec![remove_label(pr, Label::AwaitingReview)];
            }
            Vec::new()
        }
        // Removing `changes requested` is left alone: approval already
        // dropped `awaiting review` on purpose. Drafts never await review.
        PrAction::Unlabeled if changed.is_requirement() => {
            if !pr.draft
                && !pr.labels.blocks_review()
                && !pr.labels.contains(Label::AwaitingReview)
            {
                return vec![add_label(pr, Label::AwaitingReview)];
            }
            Vec::new()
        }
        _ => Vec::new(),
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
    info!(
        pr = %event.pr.number,
        action = ?event.action,
        label = event.label.as_deref().unwrap_or_default(),
        repo = %event.repo,
        "Handling manual label change"
    );

    let effects = manual_label_effects(event);
    if !effects.is_empty() {
        info!(pr = %event.pr.number, ?effects, "Updating {}", Label::AwaitingReview);
    }
    executor.run_all(effects).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockGitHub, pr_snapshot};
    use crate::types::{LabelSet, RepoId};

    fn label_event(action: PrAction, changed: &str, labels: LabelSet) -> PullRequestEvent {
        let mut pr = pr_snapshot();
        pr.labels = labels;
        PullRequestEvent {
            repo: RepoId::new("octo", "algos"),
            action,
            pr,
            installation_id: None,
            label: Some(changed.to_string()),
        }
    }

    #[test]
    fn adding_a_requirement_drops_awaiting_review() {
        let event = label_event(
            PrAction::Labeled,
            "require tests",
            LabelSet::from([Label::RequireTest, Label::AwaitingReview]),
        );
        assert_eq!(
            manual_label_effects(&event),
            vec![remove_label(&event.pr, Label::AwaitingReview)]
        );
    }

    #[test]
    fn adding_changes_requested_drops_awaiting_review() {
        let event = label_event(
            PrAction::Labeled,
            "changes requested",
            LabelSet::from([Label::ChangesRequested, Label::AwaitingReview]),
        );
        assert_eq!(
            manual_label_effects(&event),
            vec![remove_label(&event.pr, Label::AwaitingReview)]
        );
    }

    #[test]
    fn adding_a_blocker_without_awaiting_review_is_noop() {
        let event = label_event(
            PrAction::Labeled,
            "require type annotations",
            LabelSet::from([Label::Annotations]),
        );
        assert!(manual_label_effects(&event).is_empty());
    }

    #[test]
    fn removing_the_last_requirement_restores_awaiting_review() {
        let event = label_event(PrAction::Unlabeled, "require descriptive names", LabelSet::new());
        assert_eq!(
            manual_label_effects(&event),
            vec![add_label(&event.pr, Label::AwaitingReview)]
        );
    }

    #[test]
    fn removing_the_last_requirement_from_a_draft_is_noop() {
        let mut event = label_event(PrAction::Unlabeled, "require tests", LabelSet::new());
        event.pr.draft = true;
        assert!(manual_label_effects(&event).is_empty());
    }

    #[test]
    fn removing_one_of_several_requirements_waits() {
        let event = label_event(
            PrAction::Unlabeled,
            "require tests",
            LabelSet::from([Label::Annotations]),
        );
        assert!(manual_label_effects(&event).is_empty());
    }

    #[test]
    fn outstanding_changes_requested_blocks_restoration() {
        let event = label_event(
            PrAction::Unlabeled,
            "require tests",
            LabelSet::from([Label::ChangesRequested]),
        );
        assert!(manual_label_effects(&event).is_empty());
    }

    #[test]
    fn removing_changes_requested_is_noop() {
        let event = label_event(PrAction::Unlabeled, "changes requested", LabelSet::new());
        assert!(manual_label_effects(&event).is_empty());
    }

    #[test]
    fn foreign_and_workflow_labels_are_ignored() {
        for (action, name) in [
            (PrAction::Labeled, "good first issue"),
            (PrAction::Unlabeled, "hacktoberfest"),
            (PrAction::Labeled, "awaiting review"),
            (PrAction::Unlabeled, "tests are failing"),
        ] {
            let event = label_event(action, name, LabelSet::from([Label::AwaitingReview]));
            assert!(manual_label_effects(&event).is_empty(), "{name}");
        }
    }

    #[tokio::test]
    async fn run_issues_the_restoring_label() {
        let mock = MockGitHub::new();
        let executor = EffectExecutor::new(mock.clone());
        let event = label_event(PrAction::Unlabeled, "require tests", LabelSet::new());

        run(&event, &executor).await.unwrap();

        assert_eq!(
            mock.effects(),
            vec![add_label(&event.pr, Label::AwaitingReview)]
        );
    }
}
