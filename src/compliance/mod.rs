//! Source compliance analysis.
//!
//! The compliance pass has three layers:
//!
//! - [`files`] decides which changed files are analyzed at all.
//! - A [`SourceAnalyzer`] turns one file's text into [`Violation`] records.
//!   [`PythonAnalyzer`] is the tree-sitter implementation.
//! - [`ComplianceReport`] combines per-file results into the requirement
//!   labels for the whole PR.
//!
//! Parse failures are values, not faults: an analyzer returns
//! [`ParseFailure`] and the caller skips the file.

pub mod files;
pub mod python;
pub mod report;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatekeeperConfig;
use crate::types::Label;

pub use files::{QualifiedFiles, extensionless_files, qualify_files};
pub use python::PythonAnalyzer;
pub use report::ComplianceReport;

/// The rule a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// No companion test file anywhere in the PR.
    MissingTest,
    /// A parameter or return position without a type annotation.
    MissingAnnotations,
    /// A function docstring without a `>>>` example.
    MissingDoctestExample,
    /// A single-letter or throwaway identifier.
    NonDescriptiveName,
}

impl RuleKind {
    /// The requirement label this rule feeds.
    pub fn label(&self) -> Label {
        match self {
            RuleKind::MissingTest | RuleKind::MissingDoctestExample => Label::RequireTest,
            RuleKind::MissingAnnotations => Label::Annotations,
            RuleKind::NonDescriptiveName => Label::DescriptiveNames,
        }
    }
}

/// 1-based position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One detected rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: RuleKind,
    pub location: Location,
    pub message: String,
}

/// Why a file could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("parser language could not be loaded: {0}")]
    LanguageUnavailable(String),

    #[error("parser produced no syntax tree")]
    NoTree,

    #[error("syntax error at {0}")]
    Syntax(Location),
}

/// Turns source text into rule violations.
///
/// Implementations must be deterministic and must not panic on any input.
pub trait SourceAnalyzer {
    fn analyze(&self, source: &str) -> Result<Vec<Violation>, ParseFailure>;
}

/// Which identifiers count as descriptive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    allow: HashSet<String>,
    deny: HashSet<String>,
}

impl NamingPolicy {
    pub fn new<A, D>(allow: A, deny: D) -> Self
    where
        A: IntoIterator<Item = String>,
        D: IntoIterator<Item = String>,
    {
        NamingPolicy {
            allow: allow.into_iter().collect(),
            deny: deny.into_iter().collect(),
        }
    }

    pub fn from_config(config: &GatekeeperConfig) -> Self {
        Self::new(
            config.short_name_allow_list.iter().cloned(),
            config.short_name_deny_list.iter().cloned(),
        )
    }

    /// The allow-list wins over both the deny-list and the length rule.
    pub fn is_descriptive(&self, name: &str) -> bool {
        if self.allow.contains(name) {
            return true;
        }
        if self.deny.contains(name) {
            return false;
        }
        name.chars().count() > 1
    }
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::from_config(&GatekeeperConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_labels() {
        assert_eq!(RuleKind::MissingTest.label(), Label::RequireTest);
        assert_eq!(RuleKind::MissingDoctestExample.label(), Label::RequireTest);
        assert_eq!(RuleKind::MissingAnnotations.label(), Label::Annotations);
        assert_eq!(RuleKind::NonDescriptiveName.label(), Label::DescriptiveNames);
    }

    #[test]
    fn naming_policy_defaults() {
        let policy = NamingPolicy::default();
        assert!(policy.is_descriptive("total"));
        assert!(policy.is_descriptive("i"));
        assert!(policy.is_descriptive("_"));
        assert!(!policy.is_descriptive("a"));
        assert!(!policy.is_descriptive("foo"));
        assert!(!policy.is_descriptive("tmp"));
    }

    #[test]
    fn allow_list_beats_deny_list() {
        let policy = NamingPolicy::new(["tmp".to_string()], ["tmp".to_string()]);
        assert!(policy.is_descriptive("tmp"));
    }
}
