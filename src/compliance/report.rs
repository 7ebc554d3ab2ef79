//! PR-level aggregation of per-file analysis results.

use tracing::debug;

use super::{ParseFailure, RuleKind, Violation};
use crate::types::LabelSet;

/// Violations found in one analyzed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: String,
    pub violations: Vec<Violation>,
}

/// Results of one compliance pass over a PR.
///
/// Rules are OR-combined across files. A missing doctest example only counts
/// when the PR also lacks a companion test file, so a PR that ships tests is
/// never asked for doctests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceReport {
    has_test_file: bool,
    files: Vec<FileReport>,
    skipped: Vec<String>,
}

impl ComplianceReport {
    pub fn new(has_test_file: bool) -> Self {
        ComplianceReport {
            has_test_file,
            ..Default::default()
        }
    }

    /// Records the analysis outcome of one file. Parse failures are skipped.
    pub fn record(&mut self, path: &str, result: Result<Vec<Violation>, ParseFailure>) {
        match result {
            Ok(violations) => self.files.push(FileReport {
                path: path.to_string(),
                violations,
            }),
            Err(failure) => {
                debug!(path, %failure, "Skipping file that failed to parse");
                self.skipped.push(path.to_string());
            }
        }
    }

    /// The PR-level [`RuleKind::MissingTest`] violation: no companion test
    /// file while some function lacks an example, so nothing exercises the
    /// submitted code. It points at the first such function.
    pub fn missing_test(&self) -> Option<Violation> {
        if self.has_test_file {
            return None;
        }
        self.all_violations()
            .find(|(_, v)| v.rule == RuleKind::MissingDoctestExample)
            .map(|(path, v)| Violation {
                rule: RuleKind::MissingTest,
                location: v.location,
                message: format!(
                    "no companion test file, and `{}` has functions without doctest examples",
                    path
                ),
            })
    }

    /// Violations that count towards requirement labels, with their file path.
    pub fn findings(&self) -> impl Iterator<Item = (&str, &Violation)> {
        let has_test_file = self.has_test_file;
        self.all_violations()
            .filter(move |(_, v)| v.rule != RuleKind::MissingDoctestExample || !has_test_file)
    }

    /// The requirement labels this pass demands.
    pub fn requirements(&self) -> LabelSet {
        self.findings().map(|(_, v)| v.rule.label()).collect()
    }

    /// Findings whose label is in `labels`, for comment summaries.
    pub fn findings_for<'r>(
        &'r self,
        labels: &'r LabelSet,
    ) -> impl Iterator<Item = (&'r str, &'r Violation)> + 'r {
        self.findings()
            .filter(move |(_, v)| labels.contains(v.rule.label()))
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn analyzed(&self) -> usize {
        self.files.len()
    }

    fn all_violations(&self) -> impl Iterator<Item = (&str, &Violation)> {
        self.files
            .iter()
            .flat_map(|file| file.violations.iter().map(move |v| (file.path.as_str(), v)))
    }
}
