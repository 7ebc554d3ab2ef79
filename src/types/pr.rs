//! Pull request snapshot types.
//!
//! A [`PrSnapshot`] is the view of a PR carried by one webhook delivery. It is
//! never cached across deliveries.

use serde::{Deserialize, Serialize};

use super::ids::{PrNumber, Sha};
use super::label::LabelSet;

/// How a user is associated with the repository, as reported by GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorAssociation {
    Owner,
    Member,
    Collaborator,
    Contributor,
    FirstTimeContributor,
    FirstTimer,
    Mannequin,
    None,
}

impl AuthorAssociation {
    /// Parses GitHub's `author_association` value, ignoring case.
    ///
    /// Unrecognised values map to `None` (no association), which is never
    /// privileged.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "OWNER" => AuthorAssociation::Owner,
            "MEMBER" => AuthorAssociation::Member,
            "COLLABORATOR" => AuthorAssociation::Collaborator,
            "CONTRIBUTOR" => AuthorAssociation::Contributor,
            "FIRST_TIME_CONTRIBUTOR" => AuthorAssociation::FirstTimeContributor,
            "FIRST_TIMER" => AuthorAssociation::FirstTimer,
            "MANNEQUIN" => AuthorAssociation::Mannequin,
            _ => AuthorAssociation::None,
        }
    }

    /// Owners, members and collaborators may review and are exempt from the
    /// shape and open-PR checks.
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            AuthorAssociation::Owner | AuthorAssociation::Member | AuthorAssociation::Collaborator
        )
    }
}

/// A pull request as delivered in a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrSnapshot {
    pub number: PrNumber,
    /// API URL of the PR.
    pub url: String,
    /// Browser URL of the PR.
    pub html_url: String,
    /// The description. `null` bodies are stored as empty strings.
    pub body: String,
    pub author_login: String,
    pub author_association: AuthorAssociation,
    /// Bot-owned labels currently on the PR.
    pub labels: LabelSet,
    pub draft: bool,
    pub requested_reviewers: Vec<String>,
    pub head_sha: Sha,
}

impl PrSnapshot {
    pub fn is_privileged_author(&self) -> bool {
        self.author_association.is_privileged()
    }
}
