//! Octocrab client wrapper scoped to a specific repository.
//!
//! `GitHubEffect` variants carry no repository, so every delivery gets a
//! client bound to the repository named in its payload.

use octocrab::Octocrab;

use crate::types::RepoId;

/// A GitHub API client scoped to one repository.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    repo: RepoId,
}

impl OctocrabClient {
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    /// `/repos/{owner}/{repo}` followed by `path`.
    pub(crate) fn repo_url(&self, path: &str) -> String {
        format!("/repos/{}/{}{}", self.owner(), self.repo_name(), path)
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
