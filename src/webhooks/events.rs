//! GitHub webhook event types.
//!
//! This module defines typed representations of the webhook events the
//! gatekeeper handles:
//!
//! - `pull_request` - lifecycle (opened, synchronize, ready_for_review) and
//!   manual label edits (labeled, unlabeled)
//! - `pull_request_review` - review submissions

use serde::{Deserialize, Serialize};

use crate::types::{AuthorAssociation, InstallationId, PrSnapshot, RepoId};

/// A parsed GitHub webhook event.
///
/// Only event types the bot acts on are represented. Unknown or irrelevant
/// events are represented by returning `None` from the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    /// A pull request changed state or had its labels edited.
    PullRequest(PullRequestEvent),

    /// A review was submitted on a pull request.
    PullRequestReview(PullRequestReviewEvent),
}

impl GitHubEvent {
    /// Returns the repository this event belongs to.
    pub fn repo_id(&self) -> &RepoId {
        match self {
            GitHubEvent::PullRequest(e) => &e.repo,
            GitHubEvent::PullRequestReview(e) => &e.repo,
        }
    }

    /// Returns the PR the event is about.
    pub fn pr(&self) -> &PrSnapshot {
        match self {
            GitHubEvent::PullRequest(e) => &e.pr,
            GitHubEvent::PullRequestReview(e) => &e.pr,
        }
    }

    pub fn installation_id(&self) -> Option<InstallationId> {
        match self {
            GitHubEvent::PullRequest(e) => e.installation_id,
            GitHubEvent::PullRequestReview(e) => e.installation_id,
        }
    }

    /// The `(kind, action)` key the router dispatches on.
    pub fn route_key(&self) -> (EventKind, Action) {
        match self {
            GitHubEvent::PullRequest(e) => (EventKind::PullRequest, Action::Pr(e.action)),
            GitHubEvent::PullRequestReview(e) => {
                (EventKind::PullRequestReview, Action::Review(e.action))
            }
        }
    }
}

/// The `X-GitHub-Event` header values the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PullRequest,
    PullRequestReview,
}

/// The action of an event, tagged by event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Pr(PrAction),
    Review(ReviewAction),
}

/// Action performed on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    /// PR was opened.
    Opened,
    /// PR was reopened.
    Reopened,
    /// PR was closed (merged or not).
    Closed,
    /// PR title or body was edited.
    Edited,
    /// PR head was updated (new commits pushed).
    Synchronize,
    /// Draft PR was marked ready for review.
    ReadyForReview,
    /// PR was converted back to a draft.
    ConvertedToDraft,
    /// A label was added.
    Labeled,
    /// A label was removed.
    Unlabeled,
}

/// A pull request event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    /// The repository.
    pub repo: RepoId,

    /// The action that triggered this event.
    pub action: PrAction,

    /// The PR as delivered with this event.
    pub pr: PrSnapshot,

    /// The app installation that received the event, if any.
    pub installation_id: Option<InstallationId>,

    /// For `labeled` / `unlabeled`, the name of the label that changed.
    ///
    /// Kept as the raw name: labels the bot does not own still arrive here.
    pub label: Option<String>,
}

/// Action performed on a pull request review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    /// Review was submitted.
    Submitted,
    /// Review was dismissed.
    Dismissed,
    /// Review body was edited.
    Edited,
}

/// Review state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

/// A submitted review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub state: ReviewState,
    /// The reviewer's association with the repository.
    pub author_association: AuthorAssociation,
    pub reviewer_login: String,
}

/// A pull request review event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestReviewEvent {
    /// The repository.
    pub repo: RepoId,

    /// The action (submitted, dismissed, edited).
    pub action: ReviewAction,

    pub review: Review,

    /// The PR the review belongs to.
    pub pr: PrSnapshot,

    pub installation_id: Option<InstallationId>,
}
