//! GitHub API error types.
//!
//! Failures are classified as transient or permanent. The gatekeeper never
//! retries on its own; the classification is logged so an operator can tell
//! a GitHub outage from a misconfigured token. A failed delivery answers 500,
//! and GitHub's redelivery does the retrying.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Likely to succeed on redelivery: 5xx, rate limits, network errors.
    Transient,

    /// Needs a human: bad credentials, missing permissions, unknown resources.
    Permanent,
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitHubErrorKind::Transient => f.write_str("transient"),
            GitHubErrorKind::Permanent => f.write_str("permanent"),
        }
    }
}

/// A classified GitHub API error.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Classifies an octocrab error by status code and message.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = Self::extract_status_code(&err);
        let message = err.to_string();
        let kind = classify(status_code, &message);

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    pub fn is_transient(&self) -> bool {
        self.kind == GitHubErrorKind::Transient
    }

    /// Extracts the HTTP status code from an octocrab error, if present.
    ///
    /// Only the `GitHub` variant carries a status; for the others the
    /// rendered message is inspected. Returning `None` falls back to
    /// message-based classification.
    fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
        if let octocrab::Error::GitHub { source, .. } = err {
            return Some(source.status_code.as_u16());
        }
        status_from_message(&err.to_string())
    }
}

fn status_from_message(err_str: &str) -> Option<u16> {
    if let Some(idx) = err_str.find("status: ") {
        let digits: String = err_str[idx + 8..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    let lower = err_str.to_lowercase();
    if err_str.contains("404") && lower.contains("not found") {
        return Some(404);
    }
    [422, 403, 401, 429, 500, 502, 503]
        .into_iter()
        .find(|code| err_str.contains(&code.to_string()))
}

fn classify(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    match status_code {
        Some(429) => GitHubErrorKind::Transient,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::Transient,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
        Some(_) => GitHubErrorKind::Permanent,
        None if is_network_error(message) => GitHubErrorKind::Transient,
        None => GitHubErrorKind::Permanent,
    }
}

fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}
