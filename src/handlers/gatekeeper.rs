//! The pull request gate.
//!
//! A delivery runs through an ordered pipeline of steps. Each step either lets
//! the PR continue or stops the pipeline with an [`Outcome`]; nothing after a
//! stopping step runs.
//!
//! | Step | Actions | Stops with |
//! |------|---------|------------|
//! | terminal guard | all | [`Outcome::AlreadyInvalid`] |
//! | shape | `opened`, unprivileged author | [`Rejection::EmptyBody`], [`Rejection::ChecklistNotTicked`] |
//! | open-PR cap | `opened`, unprivileged author, cap > 0 | [`Rejection::TooManyOpenPrs`] |
//! | draft gate | `opened`, `synchronize` | [`Outcome::SkippedDraft`] |
//! | extensionless files | `opened`, `synchronize` | [`Rejection::ExtensionlessFiles`] |
//! | compliance | `opened`, `synchronize`, `ready_for_review` | never |
//! | default label | `opened` | never |
//!
//! A rejection comments, closes the PR and unassigns its reviewers, so a PR
//! is closed at most once per delivery.

use std::fmt;

use tracing::{debug, info, warn};

use super::{HandlerError, add_label, is_settled};
use crate::comments;
use crate::compliance::{ComplianceReport, SourceAnalyzer, extensionless_files, qualify_files};
use crate::config::GatekeeperConfig;
use crate::effects::{EffectExecutor, FileChange, GitHubEffect, GitHubInterpreter, OpenPrSearch};
use crate::reconcile::LabelPlan;
use crate::types::{Label, LabelSet, PrNumber, PrSnapshot};
use crate::webhooks::events::{PrAction, PullRequestEvent};

/// Whether the pipeline goes on after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop(Outcome),
}

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The PR already carried `invalid`; nothing was done.
    AlreadyInvalid,
    /// The PR was commented on, closed and unassigned.
    Rejected(Rejection),
    /// The PR is a draft; compliance waits for `ready_for_review`.
    SkippedDraft,
    /// Every applicable step ran. `requirements` is what the compliance pass
    /// demanded, empty when it did not run.
    Completed { requirements: LabelSet },
}

/// Why a PR was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyBody,
    ChecklistNotTicked,
    /// The author's other open PRs, ascending.
    TooManyOpenPrs(Vec<PrNumber>),
    ExtensionlessFiles(Vec<String>),
}

impl Rejection {
    /// Whether this rejection marks the PR `invalid` as well as closing it.
    ///
    /// Exceeding the open-PR cap is not the PR's own fault, so it is closed
    /// without the terminal label.
    pub fn marks_invalid(&self) -> bool {
        !matches!(self, Rejection::TooManyOpenPrs(_))
    }

    pub fn comment(&self, pr: &PrSnapshot, config: &GatekeeperConfig) -> String {
        let login = &pr.author_login;
        match self {
            Rejection::EmptyBody => comments::empty_body(login),
            Rejection::ChecklistNotTicked => {
                comments::checklist_not_ticked(login, &config.checklist_marker)
            }
            Rejection::TooManyOpenPrs(others) => {
                comments::too_many_open_prs(login, others, config.max_open_prs_per_author)
            }
            Rejection::ExtensionlessFiles(files) => comments::extensionless_files(login, files),
        }
    }

    /// Comment, `invalid` where applicable, close, then unassign reviewers.
    pub fn effects(&self, pr: &PrSnapshot, config: &GatekeeperConfig) -> Vec<GitHubEffect> {
        let mut effects = vec![GitHubEffect::PostComment {
            pr: pr.number,
            body: self.comment(pr, config),
        }];
        if self.marks_invalid() {
            effects.push(add_label(pr, Label::Invalid));
        }
        effects.push(GitHubEffect::ClosePr { pr: pr.number });
        if !pr.requested_reviewers.is_empty() {
            effects.push(GitHubEffect::UnassignReviewers {
                pr: pr.number,
                reviewers: pr.requested_reviewers.clone(),
            });
        }
        effects
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyBody => write!(f, "empty body"),
            Rejection::ChecklistNotTicked => write!(f, "checklist not ticked"),
            Rejection::TooManyOpenPrs(others) => write!(f, "{} other open PR(s)", others.len()),
            Rejection::ExtensionlessFiles(files) => {
                write!(f, "{} extensionless file(s)", files.len())
            }
        }
    }
}

/// Checks the PR description.
pub fn check_shape(config: &GatekeeperConfig, pr: &PrSnapshot) -> Option<Rejection> {
    if pr.body.trim().is_empty() {
        Some(Rejection::EmptyBody)
    } else if !config.is_checklist_ticked(&pr.body) {
        Some(Rejection::ChecklistNotTicked)
    } else {
        None
    }
}

/// Checks the author's other open PRs against the cap.
///
/// The search may or may not already include `pr` itself, so it is excluded
/// before counting.
pub fn check_open_prs(
    config: &GatekeeperConfig,
    pr: &PrSnapshot,
    search: &OpenPrSearch,
) -> Option<Rejection> {
    let mut others: Vec<PrNumber> = search
        .numbers
        .iter()
        .copied()
        .filter(|&number| number != pr.number)
        .collect();
    others.sort();
    others.dedup();

    (others.len() >= config.max_open_prs_per_author).then_some(Rejection::TooManyOpenPrs(others))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    TerminalGuard,
    Shape,
    OpenPrCap,
    DraftGate,
    Extensionless,
    Compliance,
    DefaultLabel,
}

const PIPELINE: [Step; 7] = [
    Step::TerminalGuard,
    Step::Shape,
    Step::OpenPrCap,
    Step::DraftGate,
    Step::Extensionless,
    Step::Compliance,
    Step::DefaultLabel,
];

impl Step {
    fn applies(self, action: PrAction, pr: &PrSnapshot, config: &GatekeeperConfig) -> bool {
        use PrAction::*;
        match self {
            Step::TerminalGuard => true,
            Step::Shape => action == Opened && !pr.is_privileged_author(),
            Step::OpenPrCap => {
                action == Opened
                    && config.max_open_prs_per_author > 0
                    && !pr.is_privileged_author()
            }
            Step::DraftGate | Step::Extensionless => matches!(action, Opened | Synchronize),
            Step::Compliance => matches!(action, Opened | Synchronize | ReadyForReview),
            Step::DefaultLabel => action == Opened,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Step::TerminalGuard => "terminal_guard",
            Step::Shape => "shape",
            Step::OpenPrCap => "open_pr_cap",
            Step::DraftGate => "draft_gate",
            Step::Extensionless => "extensionless",
            Step::Compliance => "compliance",
            Step::DefaultLabel => "default_label",
        }
    }
}

/// Runs the gate for one `pull_request` delivery.
pub async fn run<G, A>(
    event: &PullRequestEvent,
    executor: &EffectExecutor<G>,
    config: &GatekeeperConfig,
    analyzer: &A,
) -> Result<Outcome, HandlerError>
where
    G: GitHubInterpreter,
    G::Error: fmt::Display,
    A: SourceAnalyzer,
{
    info!(
        pr = %event.pr.number,
        action = ?event.action,
        repo = %event.repo,
        url = %event.pr.url,
        "Running gatekeeper"
    );

    let mut pass = Pass {
        event,
        executor,
        config,
        analyzer,
        files: None,
        requirements: LabelSet::new(),
    };

    for step in PIPELINE {
        if !step.applies(event.action, &event.pr, config) {
            continue;
        }
        debug!(pr = %event.pr.number, step = step.name(), "Gatekeeper step");
        if let Flow::Stop(outcome) = pass.step(step).await? {
            info!(pr = %event.pr.number, step = step.name(), ?outcome, "Gatekeeper stopped");
            return Ok(outcome);
        }
    }

    Ok(Outcome::Completed {
        requirements: pass.requirements,
    })
}

/// State carried between the steps of one run.
struct Pass<'a, G, A> {
    event: &'a PullRequestEvent,
    executor: &'a EffectExecutor<G>,
    config: &'a GatekeeperConfig,
    analyzer: &'a A,
    /// Changed files, fetched at most once.
    files: Option<Vec<FileChange>>,
    requirements: LabelSet,
}

impl<G, A> Pass<'_, G, A>
where
    G: GitHubInterpreter,
    G::Error: fmt::Display,
    A: SourceAnalyzer,
{
    async fn step(&mut self, step: Step) -> Result<Flow, HandlerError> {
        let event = self.event;
        let pr = &event.pr;
        match step {
            Step::TerminalGuard => {
                if is_settled(pr) {
                    return Ok(Flow::Stop(Outcome::AlreadyInvalid));
                }
                Ok(Flow::Continue)
            }
            Step::Shape => match check_shape(self.config, pr) {
                Some(rejection) => self.reject(rejection).await,
                None => Ok(Flow::Continue),
            },
            Step::OpenPrCap => {
                let search = self.executor.open_prs(&pr.author_login).await?;
                if search.total_count > search.numbers.len() as u64 {
                    warn!(
                        author = %pr.author_login,
                        total_count = search.total_count,
                        listed = search.numbers.len(),
                        "Open PR search returned fewer results than it reported"
                    );
                }
                match check_open_prs(self.config, pr, &search) {
                    Some(rejection) => self.reject(rejection).await,
                    None => Ok(Flow::Continue),
                }
            }
            Step::DraftGate => {
                if pr.draft {
                    return Ok(Flow::Stop(Outcome::SkippedDraft));
                }
                Ok(Flow::Continue)
            }
            Step::Extensionless => {
                let config = self.config;
                let offending = extensionless_files(config, self.changed_files().await?);
                if offending.is_empty() {
                    return Ok(Flow::Continue);
                }
                self.reject(Rejection::ExtensionlessFiles(offending)).await
            }
            Step::Compliance => {
                self.compliance().await?;
                Ok(Flow::Continue)
            }
            Step::DefaultLabel => {
                if self.requirements.is_empty() && !pr.labels.contains(Label::AwaitingReview) {
                    info!(pr = %pr.number, "Adding {}", Label::AwaitingReview);
                    self.executor
                        .run_all(vec![add_label(pr, Label::AwaitingReview)])
                        .await?;
                }
                Ok(Flow::Continue)
            }
        }
    }

    async fn reject(&self, rejection: Rejection) -> Result<Flow, HandlerError> {
        let pr = &self.event.pr;
        info!(pr = %pr.number, url = %pr.html_url, %rejection, "Rejecting PR");
        self.executor
            .run_all(rejection.effects(pr, self.config))
            .await?;
        Ok(Flow::Stop(Outcome::Rejected(rejection)))
    }

    async fn changed_files(&mut self) -> Result<&[FileChange], HandlerError> {
        if self.files.is_none() {
            let files = self.executor.changed_files(self.event.pr.number).await?;
            self.files = Some(files);
        }
        Ok(self.files.as_deref().unwrap_or_default())
    }

    /// Analyzes the qualifying sources and reconciles requirement labels.
    async fn compliance(&mut self) -> Result<(), HandlerError> {
        let config = self.config;
        let qualified = qualify_files(config, self.changed_files().await?);
        let event = self.event;
        let pr = &event.pr;

        let mut report = ComplianceReport::new(qualified.has_test_file);
        for file in &qualified.sources {
            let text = self.executor.file_content(&file.filename, &pr.head_sha).await?;
            report.record(&file.filename, self.analyzer.analyze(&text));
        }

        let desired = report.requirements();
        let plan = LabelPlan::compute(&desired, &pr.labels);
        debug!(
            pr = %pr.number,
            analyzed = report.analyzed(),
            skipped = report.skipped().len(),
            ?plan,
            "Compliance pass finished"
        );

        if !plan.is_empty() {
            info!(
                pr = %pr.number,
                added = ?plan.to_add,
                removed = ?plan.to_remove,
                "Reconciling labels"
            );
        }

        let mut effects = Vec::new();
        if event.action == PrAction::Opened && !plan.to_add.is_empty() {
            effects.push(GitHubEffect::PostComment {
                pr: pr.number,
                body: comments::compliance_summary(&pr.author_login, &report, &plan.added()),
            });
        }
        effects.extend(plan.effects(pr.number));
        self.executor.run_all(effects).await?;

        self.requirements = desired;
        Ok(())
    }
}
