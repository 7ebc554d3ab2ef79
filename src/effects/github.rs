//! GitHub API effect types.
//!
//! These types describe the GitHub operations the gatekeeper needs as data,
//! without executing them. An interpreter executes them against the real API
//! or, in tests, against canned responses.

use serde::{Deserialize, Serialize};

use crate::types::{Label, PrNumber, Sha};

/// A GitHub API effect.
///
/// Effects are repo-scoped: the interpreter is constructed with a `RepoId`, so
/// effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Reads ────────────────────────────────────────────────────────────────
    /// List every file changed by a PR, draining all pages.
    ListChangedFiles { pr: PrNumber },

    /// Fetch the text of a file at a given commit.
    GetFileContent { path: String, reference: Sha },

    /// Search the open PRs authored by `author` in this repository.
    SearchOpenPrs { author: String },

    /// List the check runs reported for a commit.
    ListCheckRuns { sha: Sha },

    // ─── Writes ───────────────────────────────────────────────────────────────
    /// Post a new comment on a PR.
    PostComment { pr: PrNumber, body: String },

    /// Add labels to a PR in a single call.
    AddLabels { pr: PrNumber, labels: Vec<Label> },

    /// Remove one label from a PR.
    RemoveLabel { pr: PrNumber, label: Label },

    /// Close a PR without merging.
    ClosePr { pr: PrNumber },

    /// Remove review requests from a PR.
    UnassignReviewers { pr: PrNumber, reviewers: Vec<String> },
}

impl GitHubEffect {
    /// Short name of the operation, for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::ListChangedFiles { .. } => "list_changed_files",
            GitHubEffect::GetFileContent { .. } => "get_file_content",
            GitHubEffect::SearchOpenPrs { .. } => "search_open_prs",
            GitHubEffect::ListCheckRuns { .. } => "list_check_runs",
            GitHubEffect::PostComment { .. } => "post_comment",
            GitHubEffect::AddLabels { .. } => "add_labels",
            GitHubEffect::RemoveLabel { .. } => "remove_label",
            GitHubEffect::ClosePr { .. } => "close_pr",
            GitHubEffect::UnassignReviewers { .. } => "unassign_reviewers",
        }
    }

    /// Whether this effect changes anything on GitHub.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            GitHubEffect::ListChangedFiles { .. }
                | GitHubEffect::GetFileContent { .. }
                | GitHubEffect::SearchOpenPrs { .. }
                | GitHubEffect::ListCheckRuns { .. }
        )
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Status of a file in a PR diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

/// A file changed by a PR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root.
    pub filename: String,
    /// API URL for the file's contents at the PR head.
    pub contents_url: String,
    pub status: FileStatus,
}

impl FileChange {
    pub fn new(filename: impl Into<String>, status: FileStatus) -> Self {
        FileChange {
            filename: filename.into(),
            contents_url: String::new(),
            status,
        }
    }
}

/// One check run reported for a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub status: String,
    /// `None` while the run has not completed.
    pub conclusion: Option<String>,
}

impl CheckRun {
    pub fn is_failure(&self) -> bool {
        self.conclusion.as_deref() == Some("failure")
    }
}

/// Result of searching an author's open PRs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPrSearch {
    /// Total reported by the search API.
    pub total_count: u64,
    /// Matching PR numbers in ascending order.
    pub numbers: Vec<PrNumber>,
}

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `ListChangedFiles`.
    ChangedFiles(Vec<FileChange>),

    /// Response to `GetFileContent`. Empty for binary or oversized files.
    FileContent(String),

    /// Response to `SearchOpenPrs`.
    OpenPrs(OpenPrSearch),

    /// Response to `ListCheckRuns`.
    CheckRuns(Vec<CheckRun>),

    /// Response to `PostComment`.
    CommentPosted,

    /// Response to `AddLabels`.
    LabelsAdded,

    /// Response to `RemoveLabel`, also when the label was already absent.
    LabelRemoved,

    /// Response to `ClosePr`.
    PrClosed,

    /// Response to `UnassignReviewers`.
    ReviewersUnassigned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_serializes_with_type_tag() {
        let effect = GitHubEffect::AddLabels {
            pr: PrNumber(7),
            labels: vec![Label::RequireTest, Label::Annotations],
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "add_labels",
                "pr": 7,
                "labels": ["require tests", "require type annotations"]
            })
        );
    }

    #[test]
    fn reads_are_not_writes() {
        assert!(!GitHubEffect::ListChangedFiles { pr: PrNumber(1) }.is_write());
        assert!(!GitHubEffect::ListCheckRuns { sha: Sha::from("abc") }.is_write());
        assert!(GitHubEffect::ClosePr { pr: PrNumber(1) }.is_write());
        assert!(
            GitHubEffect::RemoveLabel {
                pr: PrNumber(1),
                label: Label::Invalid
            }
            .is_write()
        );
    }

    #[test]
    fn check_run_failure_requires_failure_conclusion() {
        let run = |conclusion: Option<&str>| CheckRun {
            status: "completed".to_string(),
            conclusion: conclusion.map(String::from),
        };
        assert!(run(Some("failure")).is_failure());
        assert!(!run(Some("success")).is_failure());
        assert!(!run(Some("cancelled")).is_failure());
        assert!(!run(None).is_failure());
    }

    #[test]
    fn file_status_uses_github_spelling() {
        let status: FileStatus = serde_json::from_str("\"modified\"").unwrap();
        assert_eq!(status, FileStatus::Modified);
    }
}
