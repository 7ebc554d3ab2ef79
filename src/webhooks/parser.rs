//! GitHub webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed [`GitHubEvent`] values.
//! The parser is designed to be robust against unknown fields and event types.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types and actions return `Ok(None)` (ignored, not error)
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{
    AuthorAssociation, InstallationId, LabelSet, PrNumber, PrSnapshot, RepoId, Sha,
};

use super::events::{
    GitHubEvent, PrAction, PullRequestEvent, PullRequestReviewEvent, Review, ReviewAction,
    ReviewState,
};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value (e.g., malformed repository name, unknown state).
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// A field required by this action is absent.
    #[error("missing field {0}")]
    MissingField(&'static str),
}

/// Parses a webhook payload into a typed event.
///
/// # Returns
///
/// * `Ok(Some(event))` - Successfully parsed a known event type and action
/// * `Ok(None)` - Unknown event type or action (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use pr_gatekeeper::webhooks::parse_webhook;
///
/// let payload = br#"{
///     "action": "assigned",
///     "pull_request": {},
///     "repository": { "full_name": "octo/algos" }
/// }"#;
///
/// // Actions the bot does not handle are ignored.
/// assert!(parse_webhook("pull_request", payload).unwrap().is_none());
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "pull_request" => parse_pull_request(payload).map(|opt| opt.map(GitHubEvent::PullRequest)),
        "pull_request_review" => parse_pull_request_review(payload)
            .map(|opt| opt.map(GitHubEvent::PullRequestReview)),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. Fields the bot merely logs are
// optional; fields its decisions depend on are required.
// ============================================================================

/// Peeks at the action before committing to a full parse, so ignored actions
/// never fail on payload shapes the bot does not care about.
#[derive(Debug, Deserialize)]
struct RawAction {
    action: String,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct RawInstallation {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawHead {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    body: Option<String>,
    user: RawUser,
    author_association: String,
    #[serde(default)]
    labels: Vec<RawLabel>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    requested_reviewers: Vec<RawUser>,
    head: RawHead,
}

impl RawPullRequest {
    fn into_snapshot(self) -> PrSnapshot {
        PrSnapshot {
            number: PrNumber(self.number),
            url: self.url.unwrap_or_default(),
            html_url: self.html_url.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            author_login: self.user.login,
            author_association: AuthorAssociation::parse(&self.author_association),
            labels: LabelSet::from_names(self.labels.iter().map(|l| l.name.as_str())),
            draft: self.draft,
            requested_reviewers: self.requested_reviewers.into_iter().map(|u| u.login).collect(),
            head_sha: Sha::new(self.head.sha),
        }
    }
}

fn parse_repo(raw: &RawRepository) -> Result<RepoId, ParseError> {
    RepoId::from_full_name(&raw.full_name).ok_or_else(|| ParseError::InvalidField {
        field: "repository.full_name",
        value: raw.full_name.clone(),
    })
}

// ============================================================================
// pull_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    pull_request: RawPullRequest,
    repository: RawRepository,
    installation: Option<RawInstallation>,
    label: Option<RawLabel>,
}

fn parse_pull_request(payload: &[u8]) -> Result<Option<PullRequestEvent>, ParseError> {
    let RawAction { action } = serde_json::from_slice(payload)?;

    let action = match action.as_str() {
        "opened" => PrAction::Opened,
        "reopened" => PrAction::Reopened,
        "closed" => PrAction::Closed,
        "edited" => PrAction::Edited,
        "synchronize" => PrAction::Synchronize,
        "ready_for_review" => PrAction::ReadyForReview,
        "converted_to_draft" => PrAction::ConvertedToDraft,
        "labeled" => PrAction::Labeled,
        "unlabeled" => PrAction::Unlabeled,
        // Other actions (assigned, review_requested, etc.) are not relevant to us
        _ => return Ok(None),
    };

    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    let label = match (action, raw.label) {
        (PrAction::Labeled | PrAction::Unlabeled, None) => {
            return Err(ParseError::MissingField("label"));
        }
        (_, label) => label.map(|l| l.name),
    };

    Ok(Some(PullRequestEvent {
        repo: parse_repo(&raw.repository)?,
        action,
        pr: raw.pull_request.into_snapshot(),
        installation_id: raw.installation.map(|i| InstallationId(i.id)),
        label,
    }))
}

// ============================================================================
// pull_request_review event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestReviewPayload {
    review: RawReview,
    pull_request: RawPullRequest,
    repository: RawRepository,
    installation: Option<RawInstallation>,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    user: RawUser,
    state: String,
    author_association: String,
}

fn parse_pull_request_review(
    payload: &[u8],
) -> Result<Option<PullRequestReviewEvent>, ParseError> {
    let RawAction { action } = serde_json::from_slice(payload)?;

    let action = match action.as_str() {
        "submitted" => ReviewAction::Submitted,
        "dismissed" => ReviewAction::Dismissed,
        "edited" => ReviewAction::Edited,
        _ => return Ok(None),
    };

    let raw: RawPullRequestReviewPayload = serde_json::from_slice(payload)?;

    // GitHub sends lower-case states in webhooks and upper-case in the API
    let state = match raw.review.state.to_uppercase().as_str() {
        "APPROVED" => ReviewState::Approved,
        "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
        "COMMENTED" => ReviewState::Commented,
        "DISMISSED" => ReviewState::Dismissed,
        "PENDING" => ReviewState::Pending,
        other => {
            return Err(ParseError::InvalidField {
                field: "review.state",
                value: other.to_string(),
            });
        }
    };

    Ok(Some(PullRequestReviewEvent {
        repo: parse_repo(&raw.repository)?,
        action,
        review: Review {
            state,
            author_association: AuthorAssociation::parse(&raw.review.author_association),
            reviewer_login: raw.review.user.login,
        },
        pr: raw.pull_request.into_snapshot(),
        installation_id: raw.installation.map(|i| InstallationId(i.id)),
    }))
}
