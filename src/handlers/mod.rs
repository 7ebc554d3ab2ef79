//! Event handlers.
//!
//! Each handler decides what to do from the typed event and the PR snapshot
//! it carries, and expresses the decision as a list of [`GitHubEffect`]s.
//! The decision functions are pure; the async `run` entry points only add the
//! reads a decision needs and hand the resulting writes to the executor.
//!
//! | Handler | Module |
//! |---------|--------|
//! | [`HandlerKind::GateKeeper`] | [`gatekeeper`] |
//! | [`HandlerKind::FailingChecks`] | [`ready`] |
//! | [`HandlerKind::ManualLabel`] | [`labels`] |
//! | [`HandlerKind::ReviewState`] | [`review`] |

pub mod gatekeeper;
pub mod labels;
pub mod ready;
pub mod review;

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::compliance::SourceAnalyzer;
use crate::config::GatekeeperConfig;
use crate::effects::{EffectError, EffectExecutor, GitHubEffect, GitHubInterpreter};
use crate::types::{Label, PrSnapshot};
use crate::webhooks::{GitHubEvent, HandlerKind, route};

pub use gatekeeper::{Flow, Outcome, Rejection};

/// Errors that abort handling of a delivery.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A GitHub call failed.
    #[error("GitHub call failed: {0}")]
    GitHub(String),

    /// GitHub answered a call with the wrong kind of response.
    #[error("unexpected response to {operation}: {response}")]
    UnexpectedResponse {
        operation: &'static str,
        response: String,
    },
}

impl From<EffectError> for HandlerError {
    fn from(err: EffectError) -> Self {
        match err {
            EffectError::GitHub { .. } => HandlerError::GitHub(err.to_string()),
            EffectError::UnexpectedResponse {
                operation,
                response,
            } => HandlerError::UnexpectedResponse {
                operation,
                response,
            },
        }
    }
}

/// What [`dispatch`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No handler is routed for the event's kind and action.
    Ignored,
    /// Every routed handler ran to completion.
    Handled,
}

/// Runs the handlers routed for `event`, in table order.
///
/// Stops at the first handler error.
pub async fn dispatch<G, A>(
    event: &GitHubEvent,
    executor: &EffectExecutor<G>,
    config: &GatekeeperConfig,
    analyzer: &A,
) -> Result<Dispatch, HandlerError>
where
    G: GitHubInterpreter,
    G::Error: fmt::Display,
    A: SourceAnalyzer,
{
    let (kind, action) = event.route_key();
    let handlers = route(kind, action);
    if handlers.is_empty() {
        debug!(?kind, ?action, "No handler routed");
        return Ok(Dispatch::Ignored);
    }

    for handler in handlers {
        match (handler, event) {
            (HandlerKind::GateKeeper, GitHubEvent::PullRequest(e)) => {
                gatekeeper::run(e, executor, config, analyzer).await?;
            }
            (HandlerKind::FailingChecks, GitHubEvent::PullRequest(e)) => {
                ready::run(e, executor).await?;
            }
            (HandlerKind::ManualLabel, GitHubEvent::PullRequest(e)) => {
                labels::run(e, executor).await?;
            }
            (HandlerKind::ReviewState, GitHubEvent::PullRequestReview(e)) => {
                review::run(e, executor).await?;
            }
            (handler, _) => {
                debug!(?handler, ?kind, "Handler does not take this event kind");
            }
        }
    }

    Ok(Dispatch::Handled)
}

/// Whether the PR already carries the terminal label. Handlers issue no calls
/// for such PRs.
pub(crate) fn is_settled(pr: &PrSnapshot) -> bool {
    if pr.labels.is_terminal() {
        info!(pr = %pr.number, "PR is already marked {}, skipping", Label::Invalid);
        return true;
    }
    false
}

/// Single-label addition.
pub(crate) fn add_label(pr: &PrSnapshot, label: Label) -> GitHubEffect {
    GitHubEffect::AddLabels {
        pr: pr.number,
        labels: vec![label],
    }
}

pub(crate) fn remove_label(pr: &PrSnapshot, label: Label) -> GitHubEffect {
    GitHubEffect::RemoveLabel {
        pr: pr.number,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::PythonAnalyzer;
    use crate::effects::{FileChange, FileStatus};
    use crate::test_utils::{MockGitHub, pr_snapshot};
    use crate::types::{AuthorAssociation, LabelSet, RepoId};
    use crate::webhooks::events::{
        PrAction, PullRequestEvent, PullRequestReviewEvent, Review, ReviewAction, ReviewState,
    };

    fn pr_event(action: PrAction) -> GitHubEvent {
        GitHubEvent::PullRequest(PullRequestEvent {
            repo: RepoId::new("octo", "algos"),
            action,
            pr: pr_snapshot(),
            installation_id: None,
            label: None,
        })
    }

    async fn run(event: &GitHubEvent, mock: MockGitHub) -> (Dispatch, MockGitHub) {
        let executor = EffectExecutor::new(mock.clone());
        let config = GatekeeperConfig::default();
        let outcome = dispatch(event, &executor, &config, &PythonAnalyzer::default())
            .await
            .unwrap();
        (outcome, mock)
    }

    #[tokio::test]
    async fn unrouted_action_is_ignored_without_calls() {
        let (outcome, mock) = run(&pr_event(PrAction::Closed), MockGitHub::new()).await;
        assert_eq!(outcome, Dispatch::Ignored);
        assert!(mock.effects().is_empty());
    }

    #[tokio::test]
    async fn ready_for_review_checks_runs_then_files() {
        let mock = MockGitHub::new().with_check_runs(&[Some("failure")]);
        let (outcome, mock) = run(&pr_event(PrAction::ReadyForReview), mock).await;

        assert_eq!(outcome, Dispatch::Handled);
        let effects = mock.effects();
        assert!(matches!(effects[0], GitHubEffect::ListCheckRuns { .. }));
        assert_eq!(effects[1], add_label(&pr_snapshot(), Label::FailedTest));
        assert!(matches!(effects[2], GitHubEffect::ListChangedFiles { .. }));
    }

    #[tokio::test]
    async fn review_event_reaches_review_handler() {
        let mut pr = pr_snapshot();
        pr.labels = LabelSet::from([Label::ChangesRequested]);
        let event = GitHubEvent::PullRequestReview(PullRequestReviewEvent {
            repo: RepoId::new("octo", "algos"),
            action: ReviewAction::Submitted,
            review: Review {
                state: ReviewState::Approved,
                author_association: AuthorAssociation::Member,
                reviewer_login: "maintainer".to_string(),
            },
            pr,
            installation_id: None,
        });

        let (_, mock) = run(&event, MockGitHub::new()).await;

        assert_eq!(
            mock.effects(),
            vec![remove_label(&pr_snapshot(), Label::ChangesRequested)]
        );
    }

    #[tokio::test]
    async fn invalid_pr_issues_no_calls_on_any_route() {
        for action in [
            PrAction::Opened,
            PrAction::Synchronize,
            PrAction::ReadyForReview,
            PrAction::Labeled,
            PrAction::Unlabeled,
        ] {
            let mut pr = pr_snapshot();
            pr.labels = LabelSet::from([Label::Invalid]);
            pr.body = String::new();
            let event = GitHubEvent::PullRequest(PullRequestEvent {
                repo: RepoId::new("octo", "algos"),
                action,
                pr,
                installation_id: None,
                label: Some(Label::RequireTest.as_str().to_string()),
            });
            let mock = MockGitHub::new()
                .with_files(vec![FileChange::new("script", FileStatus::Added)])
                .with_check_runs(&[Some("failure")]);

            let (_, mock) = run(&event, mock).await;

            assert!(mock.effects().is_empty(), "{action:?}");
        }
    }

    #[tokio::test]
    async fn invalid_pr_ignores_privileged_reviews() {
        for state in [ReviewState::ChangesRequested, ReviewState::Approved] {
            let mut pr = pr_snapshot();
            pr.labels = LabelSet::from([Label::Invalid, Label::AwaitingReview]);
            let event = GitHubEvent::PullRequestReview(PullRequestReviewEvent {
                repo: RepoId::new("octo", "algos"),
                action: ReviewAction::Submitted,
                review: Review {
                    state,
                    author_association: AuthorAssociation::Owner,
                    reviewer_login: "maintainer".to_string(),
                },
                pr,
                installation_id: None,
            });

            let (outcome, mock) = run(&event, MockGitHub::new()).await;

            assert_eq!(outcome, Dispatch::Handled);
            assert!(mock.effects().is_empty(), "{state:?}");
        }
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let mock = MockGitHub::new().failing_on("list_changed_files");
        let executor = EffectExecutor::new(mock);
        let config = GatekeeperConfig::default();

        let err = dispatch(
            &pr_event(PrAction::Synchronize),
            &executor,
            &config,
            &PythonAnalyzer::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, HandlerError::GitHub(_)));
    }
}
