//! GitHub effect interpreter using octocrab.
//!
//! Reads that the typed octocrab builders cover (comments, labels, file
//! contents) go through them. The rest are raw REST calls deserialized into
//! private response structs, which keeps this module independent of
//! octocrab's model churn.
//!
//! Paginated listings are drained completely, 100 items per page.

use serde::{Deserialize, Serialize};

use crate::effects::{
    CheckRun, FileChange, FileStatus, GitHubEffect, GitHubInterpreter, GitHubResponse,
    OpenPrSearch,
};
use crate::types::{Label, PrNumber, Sha};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

const PER_PAGE: u32 = 100;

// ─── Response Types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawFile {
    filename: String,
    status: FileStatus,
    #[serde(default)]
    contents_url: String,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    total_count: u64,
    #[serde(default)]
    items: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct RawCheckRuns {
    #[serde(default)]
    check_runs: Vec<RawCheckRun>,
}

#[derive(Debug, Deserialize)]
struct RawCheckRun {
    status: String,
    conclusion: Option<String>,
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u32,
    page: u32,
}

#[derive(Debug, Serialize)]
struct SearchParams {
    q: String,
    per_page: u32,
    page: u32,
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        let name = effect.name();
        interpret_github_effect(self, effect).await.inspect_err(|err| {
            tracing::warn!(
                repo = %self.repo(),
                effect = name,
                kind = %err.kind,
                status = ?err.status_code,
                transient = err.is_transient(),
                "GitHub call failed"
            );
        })
    }
}

/// Executes one effect against the GitHub API. Failures are returned as-is;
/// nothing is retried here.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::ListChangedFiles { pr } => list_changed_files(client, pr).await,
        GitHubEffect::GetFileContent { path, reference } => {
            get_file_content(client, &path, &reference).await
        }
        GitHubEffect::SearchOpenPrs { author } => search_open_prs(client, &author).await,
        GitHubEffect::ListCheckRuns { sha } => list_check_runs(client, &sha).await,
        GitHubEffect::PostComment { pr, body } => post_comment(client, pr, body).await,
        GitHubEffect::AddLabels { pr, labels } => add_labels(client, pr, &labels).await,
        GitHubEffect::RemoveLabel { pr, label } => remove_label(client, pr, label).await,
        GitHubEffect::ClosePr { pr } => close_pr(client, pr).await,
        GitHubEffect::UnassignReviewers { pr, reviewers } => {
            unassign_reviewers(client, pr, reviewers).await
        }
    }
}

// ─── Reads ────────────────────────────────────────────────────────────────────

async fn list_changed_files(
    client: &OctocrabClient,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.repo_url(&format!("/pulls/{}/files", pr.0));
    let mut page = 1u32;
    let mut all_files = Vec::new();

    loop {
        let params = PageParams {
            per_page: PER_PAGE,
            page,
        };
        let items: Vec<RawFile> = client
            .inner()
            .get(&url, Some(&params))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = is_last_page(items.len());
        all_files.extend(items.into_iter().map(|file| FileChange {
            filename: file.filename,
            contents_url: file.contents_url,
            status: file.status,
        }));

        if is_last_page {
            break;
        }
        page += 1;
    }

    Ok(GitHubResponse::ChangedFiles(all_files))
}

/// Fetches a file's text at `reference`. Binary and oversized files, which
/// GitHub serves without decodable content, read as empty.
async fn get_file_content(
    client: &OctocrabClient,
    path: &str,
    reference: &Sha,
) -> Result<GitHubResponse, GitHubApiError> {
    let mut contents = client
        .inner()
        .repos(client.owner(), client.repo_name())
        .get_content()
        .path(path)
        .r#ref(reference.as_str())
        .send()
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    let text = contents
        .take_items()
        .into_iter()
        .next()
        .and_then(|item| item.decoded_content())
        .unwrap_or_default();

    Ok(GitHubResponse::FileContent(text))
}

async fn search_open_prs(
    client: &OctocrabClient,
    author: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let q = search_query(author, &client.repo().to_string());
    let mut page = 1u32;
    let mut total_count = 0;
    let mut numbers = Vec::new();

    loop {
        let params = SearchParams {
            q: q.clone(),
            per_page: PER_PAGE,
            page,
        };
        let result: RawSearch = client
            .inner()
            .get("/search/issues", Some(&params))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        total_count = result.total_count;
        let is_last_page = is_last_page(result.items.len());
        numbers.extend(result.items.into_iter().map(|issue| PrNumber(issue.number)));

        if is_last_page {
            break;
        }
        page += 1;
    }

    numbers.sort();
    Ok(GitHubResponse::OpenPrs(OpenPrSearch {
        total_count,
        numbers,
    }))
}

async fn list_check_runs(
    client: &OctocrabClient,
    sha: &Sha,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.repo_url(&format!("/commits/{}/check-runs", sha));
    let mut page = 1u32;
    let mut all_runs = Vec::new();

    loop {
        let params = PageParams {
            per_page: PER_PAGE,
            page,
        };
        let result: RawCheckRuns = client
            .inner()
            .get(&url, Some(&params))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = is_last_page(result.check_runs.len());
        all_runs.extend(result.check_runs.into_iter().map(|run| CheckRun {
            status: run.status,
            conclusion: run.conclusion,
        }));

        if is_last_page {
            break;
        }
        page += 1;
    }

    Ok(GitHubResponse::CheckRuns(all_runs))
}

// ─── Writes ───────────────────────────────────────────────────────────────────

async fn post_comment(
    client: &OctocrabClient,
    pr: PrNumber,
    body: String,
) -> Result<GitHubResponse, GitHubApiError> {
    client
        .inner()
        .issues(client.owner(), client.repo_name())
        .create_comment(pr.0, body)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::CommentPosted)
}

async fn add_labels(
    client: &OctocrabClient,
    pr: PrNumber,
    labels: &[Label],
) -> Result<GitHubResponse, GitHubApiError> {
    let names: Vec<String> = labels.iter().map(|label| label.as_str().to_string()).collect();
    client
        .inner()
        .issues(client.owner(), client.repo_name())
        .add_labels(pr.0, &names)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::LabelsAdded)
}

/// Removes one label. A label that is already gone counts as removed.
async fn remove_label(
    client: &OctocrabClient,
    pr: PrNumber,
    label: Label,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = label_url(client, pr, label);
    let result: Result<serde_json::Value, _> = client.inner().delete(&url, None::<&()>).await;

    match result {
        Ok(_) => Ok(GitHubResponse::LabelRemoved),
        Err(e) => {
            let err = GitHubApiError::from_octocrab(e);
            if err.is_not_found() {
                tracing::debug!(pr = %pr, %label, "Label already absent");
                Ok(GitHubResponse::LabelRemoved)
            } else {
                Err(err)
            }
        }
    }
}

async fn close_pr(client: &OctocrabClient, pr: PrNumber) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.repo_url(&format!("/pulls/{}", pr.0));
    let body = serde_json::json!({ "state": "closed" });
    let _: serde_json::Value = client
        .inner()
        .patch(&url, Some(&body))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::PrClosed)
}

async fn unassign_reviewers(
    client: &OctocrabClient,
    pr: PrNumber,
    reviewers: Vec<String>,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.repo_url(&format!("/pulls/{}/requested_reviewers", pr.0));
    let body = serde_json::json!({ "reviewers": reviewers });
    let _: serde_json::Value = client
        .inner()
        .delete(&url, Some(&body))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::ReviewersUnassigned)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn is_last_page(items: usize) -> bool {
    items < PER_PAGE as usize
}

/// Issue-search query for an author's open PRs in one repository.
fn search_query(author: &str, full_name: &str) -> String {
    format!("is:pr is:open author:{} repo:{}", author, full_name)
}

/// Label names contain spaces, so they are percent-encoded into the path.
fn label_url(client: &OctocrabClient, pr: PrNumber, label: Label) -> String {
    client.repo_url(&format!(
        "/issues/{}/labels/{}",
        pr.0,
        urlencoding::encode(label.as_str())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoId;

    fn client() -> OctocrabClient {
        OctocrabClient::new(octocrab::Octocrab::default(), RepoId::new("octo", "algos"))
    }

    #[test]
    fn search_query_scopes_to_author_and_repo() {
        assert_eq!(
            search_query("contributor", "octo/algos"),
            "is:pr is:open author:contributor repo:octo/algos"
        );
    }

    #[tokio::test]
    async fn label_url_encodes_spaces() {
        assert_eq!(
            label_url(&client(), PrNumber(7), Label::Annotations),
            "/repos/octo/algos/issues/7/labels/require%20type%20annotations"
        );
    }

    #[test]
    fn pagination_stops_on_short_page() {
        assert!(is_last_page(0));
        assert!(is_last_page(99));
        assert!(!is_last_page(100));
    }

    #[test]
    fn changed_files_deserialize() {
        let json = r#"[
            {"filename": "sorts/bubble.py", "status": "added", "contents_url": "https://x", "additions": 3},
            {"filename": "old.py", "status": "removed"}
        ]"#;
        let files: Vec<RawFile> = serde_json::from_str(json).unwrap();
        assert_eq!(files[0].status, FileStatus::Added);
        assert_eq!(files[1].status, FileStatus::Removed);
        assert_eq!(files[1].contents_url, "");
    }

    #[test]
    fn search_response_deserializes() {
        let json = r#"{"total_count": 2, "incomplete_results": false,
                       "items": [{"number": 9, "title": "a"}, {"number": 4}]}"#;
        let search: RawSearch = serde_json::from_str(json).unwrap();
        assert_eq!(search.total_count, 2);
        assert_eq!(
            search.items.iter().map(|i| i.number).collect::<Vec<_>>(),
            vec![9, 4]
        );
    }

    #[test]
    fn check_runs_deserialize_with_pending_conclusion() {
        let json = r#"{"total_count": 2, "check_runs": [
            {"status": "completed", "conclusion": "failure", "name": "ci"},
            {"status": "in_progress", "conclusion": null}
        ]}"#;
        let runs: RawCheckRuns = serde_json::from_str(json).unwrap();
        assert_eq!(runs.check_runs[0].conclusion.as_deref(), Some("failure"));
        assert_eq!(runs.check_runs[1].conclusion, None);
        assert_eq!(runs.check_runs[1].status, "in_progress");
    }
}
