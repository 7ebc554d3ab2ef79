//! Shared test utilities: a recording GitHub interpreter and payload builders.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::effects::{
    CheckRun, FileChange, GitHubEffect, GitHubInterpreter, GitHubResponse, OpenPrSearch,
};
use crate::server::InterpreterFactory;
use crate::types::{AuthorAssociation, LabelSet, PrNumber, PrSnapshot, RepoId, Sha};

/// Mock GitHub interpreter for testing.
///
/// Reads are answered from canned data; every effect, read or write, is
/// recorded in order. Clones share the same recording.
#[derive(Clone, Default)]
pub struct MockGitHub {
    files: Vec<FileChange>,
    contents: HashMap<String, String>,
    open_prs: Option<OpenPrSearch>,
    check_runs: Vec<CheckRun>,
    fail_on: Option<&'static str>,
    recorded: Arc<Mutex<Vec<GitHubEffect>>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, files: Vec<FileChange>) -> Self {
        self.files = files;
        self
    }

    pub fn with_content(mut self, path: &str, text: &str) -> Self {
        self.contents.insert(path.to_string(), text.to_string());
        self
    }

    pub fn with_open_prs(mut self, numbers: &[u64]) -> Self {
        self.open_prs = Some(OpenPrSearch {
            total_count: numbers.len() as u64,
            numbers: numbers.iter().copied().map(PrNumber).collect(),
        });
        self
    }

    pub fn with_check_runs(mut self, conclusions: &[Option<&str>]) -> Self {
        self.check_runs = conclusions
            .iter()
            .map(|conclusion| CheckRun {
                status: "completed".to_string(),
                conclusion: conclusion.map(String::from),
            })
            .collect();
        self
    }

    /// Makes every effect with this operation name fail.
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// Every effect interpreted so far, in order.
    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.recorded.lock().unwrap().clone()
    }

    /// Only the effects that change GitHub state, in order.
    pub fn writes(&self) -> Vec<GitHubEffect> {
        self.effects().into_iter().filter(GitHubEffect::is_write).collect()
    }

    fn respond(&self, effect: &GitHubEffect) -> GitHubResponse {
        match effect {
            GitHubEffect::ListChangedFiles { .. } => {
                GitHubResponse::ChangedFiles(self.files.clone())
            }
            GitHubEffect::GetFileContent { path, .. } => {
                GitHubResponse::FileContent(self.contents.get(path).cloned().unwrap_or_default())
            }
            GitHubEffect::SearchOpenPrs { .. } => {
                GitHubResponse::OpenPrs(self.open_prs.clone().unwrap_or(OpenPrSearch {
                    total_count: 0,
                    numbers: Vec::new(),
                }))
            }
            GitHubEffect::ListCheckRuns { .. } => {
                GitHubResponse::CheckRuns(self.check_runs.clone())
            }
            GitHubEffect::PostComment { .. } => GitHubResponse::CommentPosted,
            GitHubEffect::AddLabels { .. } => GitHubResponse::LabelsAdded,
            GitHubEffect::RemoveLabel { .. } => GitHubResponse::LabelRemoved,
            GitHubEffect::ClosePr { .. } => GitHubResponse::PrClosed,
            GitHubEffect::UnassignReviewers { .. } => GitHubResponse::ReviewersUnassigned,
        }
    }
}

impl GitHubInterpreter for MockGitHub {
    type Error = String;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        self.recorded.lock().unwrap().push(effect.clone());
        let result = if self.fail_on == Some(effect.name()) {
            Err(format!("injected failure for {}", effect.name()))
        } else {
            Ok(self.respond(&effect))
        };
        async move { result }
    }
}

/// Every repository shares the same recording.
impl InterpreterFactory for MockGitHub {
    type Interpreter = MockGitHub;

    fn for_repo(&self, _repo: &RepoId) -> MockGitHub {
        self.clone()
    }
}

/// A non-draft PR #42 by `contributor` with a ticked checklist and two
/// requested reviewers.
pub fn pr_snapshot() -> PrSnapshot {
    PrSnapshot {
        number: PrNumber(42),
        url: "https://api.github.com/repos/octo/algos/pulls/42".to_string(),
        html_url: "https://github.com/octo/algos/pull/42".to_string(),
        body: "Adds bubble sort.\n\n- [x] I have read CONTRIBUTING.md".to_string(),
        author_login: "contributor".to_string(),
        author_association: AuthorAssociation::None,
        labels: LabelSet::new(),
        draft: false,
        requested_reviewers: vec!["test1".to_string(), "test2".to_string()],
        head_sha: Sha::new("a".repeat(40)),
    }
}

/// Python source that passes every compliance rule.
pub const CLEAN_SOURCE: &str = r#"
def add(first: int, second: int) -> int:
    """
    Return the sum of two numbers.

    >>> add(1, 2)
    3
    """
    return first + second
"#;
