//! The closed set of labels this bot owns, and a typed set over them.
//!
//! Labels are the only externally visible state the bot keeps. Every decision
//! is made against a [`LabelSet`] built from the PR snapshot delivered with the
//! event, never from local memory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A label owned by the bot.
///
/// The declaration order is the order labels are posted and removed in, so
/// batched additions are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "invalid")]
    Invalid,
    #[serde(rename = "awaiting review")]
    AwaitingReview,
    #[serde(rename = "changes requested")]
    ChangesRequested,
    #[serde(rename = "tests are failing")]
    FailedTest,
    #[serde(rename = "require tests")]
    RequireTest,
    #[serde(rename = "require descriptive names")]
    DescriptiveNames,
    #[serde(rename = "require type annotations")]
    Annotations,
}

/// Which role a label plays in the PR lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelCategory {
    /// The PR was rejected and closed. Nothing else happens after this.
    Terminal,
    /// Review and CI status.
    Workflow,
    /// One missing-quality violation detected in submitted source.
    Requirement,
}

impl Label {
    pub const ALL: [Label; 7] = [
        Label::Invalid,
        Label::AwaitingReview,
        Label::ChangesRequested,
        Label::FailedTest,
        Label::RequireTest,
        Label::DescriptiveNames,
        Label::Annotations,
    ];

    pub const REQUIREMENTS: [Label; 3] =
        [Label::RequireTest, Label::DescriptiveNames, Label::Annotations];

    /// The exact label text used on GitHub.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Invalid => "invalid",
            Label::AwaitingReview => "awaiting review",
            Label::ChangesRequested => "changes requested",
            Label::FailedTest => "tests are failing",
            Label::RequireTest => "require tests",
            Label::DescriptiveNames => "require descriptive names",
            Label::Annotations => "require type annotations",
        }
    }

    /// Matches a label name exactly. Names the bot does not own return `None`.
    pub fn from_name(name: &str) -> Option<Label> {
        Label::ALL.into_iter().find(|label| label.as_str() == name)
    }

    pub fn category(&self) -> LabelCategory {
        match self {
            Label::Invalid => LabelCategory::Terminal,
            Label::AwaitingReview | Label::ChangesRequested | Label::FailedTest => {
                LabelCategory::Workflow
            }
            Label::RequireTest | Label::DescriptiveNames | Label::Annotations => {
                LabelCategory::Requirement
            }
        }
    }

    pub fn is_requirement(&self) -> bool {
        self.category() == LabelCategory::Requirement
    }

    /// Whether this label means the PR still needs work before review.
    ///
    /// `awaiting review` must be absent while any blocking label is present.
    pub fn blocks_review(&self) -> bool {
        self.is_requirement() || *self == Label::ChangesRequested
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of bot-owned labels with deterministic iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<Label>);

impl LabelSet {
    pub fn new() -> Self {
        LabelSet(BTreeSet::new())
    }

    /// Builds a set from raw label names, dropping names the bot does not own.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| Label::from_name(name.as_ref()))
            .collect()
    }

    pub fn contains(&self, label: Label) -> bool {
        self.0.contains(&label)
    }

    /// Returns true if the label was newly inserted.
    pub fn insert(&mut self, label: Label) -> bool {
        self.0.insert(label)
    }

    /// Returns true if the label was present.
    pub fn remove(&mut self, label: Label) -> bool {
        self.0.remove(&label)
    }

    pub fn has_any(&self, category: LabelCategory) -> bool {
        self.0.iter().any(|label| label.category() == category)
    }

    pub fn is_terminal(&self) -> bool {
        self.has_any(LabelCategory::Terminal)
    }

    /// Whether any label that rules out `awaiting review` is present.
    pub fn blocks_review(&self) -> bool {
        self.0.iter().any(Label::blocks_review)
    }

    /// The requirement labels in this set.
    pub fn requirements(&self) -> LabelSet {
        self.0.iter().copied().filter(Label::is_requirement).collect()
    }

    /// Labels in `self` that are not in `other`, in label order.
    pub fn difference(&self, other: &LabelSet) -> Vec<Label> {
        self.0.difference(&other.0).copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        LabelSet(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Label; N]> for LabelSet {
    fn from(labels: [Label; N]) -> Self {
        labels.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_label() -> impl Strategy<Value = Label> {
        proptest::sample::select(Label::ALL.to_vec())
    }

    pub fn arb_label_set() -> impl Strategy<Value = LabelSet> {
        prop::collection::vec(arb_label(), 0..8).prop_map(LabelSet::from_iter)
    }

    #[test]
    fn names_match_github_literals() {
        let names: Vec<&str> = Label::ALL.iter().map(Label::as_str).collect();
        assert_eq!(
            names,
            [
                "invalid",
                "awaiting review",
                "changes requested",
                "tests are failing",
                "require tests",
                "require descriptive names",
                "require type annotations",
            ]
        );
    }

    #[test]
    fn serde_uses_github_literals() {
        let json = serde_json::to_string(&Label::Annotations).unwrap();
        assert_eq!(json, "\"require type annotations\"");
    }

    #[test]
    fn categories_partition_labels() {
        assert_eq!(Label::Invalid.category(), LabelCategory::Terminal);
        for label in [Label::AwaitingReview, Label::ChangesRequested, Label::FailedTest] {
            assert_eq!(label.category(), LabelCategory::Workflow);
        }
        for label in Label::REQUIREMENTS {
            assert_eq!(label.category(), LabelCategory::Requirement);
        }
    }

    #[test]
    fn from_names_ignores_foreign_labels() {
        let set = LabelSet::from_names(["bug", "require tests", "Require Tests", "invalid"]);
        assert_eq!(set, LabelSet::from([Label::Invalid, Label::RequireTest]));
    }

    #[test]
    fn blocks_review_covers_requirements_and_changes_requested() {
        assert!(LabelSet::from([Label::ChangesRequested]).blocks_review());
        assert!(LabelSet::from([Label::Annotations]).blocks_review());
        assert!(!LabelSet::from([Label::AwaitingReview, Label::FailedTest]).blocks_review());
    }

    proptest! {
        #[test]
        fn name_lookup_inverts_as_str(label in arb_label()) {
            prop_assert_eq!(Label::from_name(label.as_str()), Some(label));
        }

        #[test]
        fn requirements_is_subset_of_requirement_category(set in arb_label_set()) {
            let reqs = set.requirements();
            prop_assert!(reqs.iter().all(|l| l.is_requirement() && set.contains(l)));
            prop_assert_eq!(
                reqs.len(),
                set.iter().filter(Label::is_requirement).count()
            );
        }

        #[test]
        fn difference_is_disjoint_from_other(a in arb_label_set(), b in arb_label_set()) {
            for label in a.difference(&b) {
                prop_assert!(a.contains(label));
                prop_assert!(!b.contains(label));
            }
        }
    }
}
