//! Runtime configuration.
//!
//! [`GatekeeperConfig`] is built once at startup and shared read-only with
//! every handler. [`Cli`] is the process-level surface that produces it; each
//! flag can also be supplied through the environment.

use std::net::SocketAddr;
use std::path::Path;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Policy knobs for the gatekeeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    /// How many other open PRs an author may hold. `0` disables the check.
    pub max_open_prs_per_author: usize,

    /// Token that must appear (case-insensitively) in a PR body.
    pub checklist_marker: String,

    /// Extension, without the dot, of files the compliance pass analyzes.
    pub source_extension: String,

    /// Top-level directories whose files are never analyzed.
    pub ignored_dirs: Vec<String>,

    /// Top-level directories where extensionless files are allowed.
    pub extensionless_allowed_dirs: Vec<String>,

    /// Short identifiers that are always accepted.
    pub short_name_allow_list: Vec<String>,

    /// Identifiers rejected regardless of length.
    pub short_name_deny_list: Vec<String>,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        GatekeeperConfig {
            max_open_prs_per_author: 1,
            checklist_marker: "[x]".to_string(),
            source_extension: "py".to_string(),
            ignored_dirs: vec![".github".to_string(), "docs".to_string()],
            extensionless_allowed_dirs: vec![".github".to_string()],
            short_name_allow_list: ["_", "i", "j", "k", "n", "x", "y", "z"]
                .map(String::from)
                .to_vec(),
            short_name_deny_list: [
                "foo", "bar", "baz", "tmp", "temp", "var", "val", "obj", "dummy",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl GatekeeperConfig {
    /// Whether the body carries the ticked checklist marker.
    pub fn is_checklist_ticked(&self, body: &str) -> bool {
        body.to_lowercase()
            .contains(&self.checklist_marker.to_lowercase())
    }

    /// Whether `path` sits under one of `dirs` (matched on the first component).
    pub fn is_under_any(path: &str, dirs: &[String]) -> bool {
        Path::new(path)
            .components()
            .next()
            .and_then(|first| first.as_os_str().to_str())
            .is_some_and(|first| dirs.iter().any(|dir| dir == first))
    }
}

/// Command-line and environment configuration for the server binary.
#[derive(Debug, Parser)]
#[command(name = "pr-gatekeeper", version, about)]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "GATEKEEPER_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Token used for GitHub API calls.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Shared secret for `X-Hub-Signature-256` verification. Unset disables
    /// verification.
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Maximum number of other open PRs per author (0 disables the check).
    #[arg(long, env = "GATEKEEPER_MAX_OPEN_PRS", default_value_t = 1)]
    pub max_open_prs: usize,

    /// Checklist token required in PR descriptions.
    #[arg(long, env = "GATEKEEPER_CHECKLIST_MARKER", default_value = "[x]")]
    pub checklist_marker: String,
}

impl Cli {
    pub fn gatekeeper_config(&self) -> GatekeeperConfig {
        GatekeeperConfig {
            max_open_prs_per_author: self.max_open_prs,
            checklist_marker: self.checklist_marker.clone(),
            ..GatekeeperConfig::default()
        }
    }
}
