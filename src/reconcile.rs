//! Requirement-label reconciliation.
//!
//! Given the requirement labels a compliance pass demands and the labels the
//! PR currently carries, [`LabelPlan::compute`] yields the minimal additions
//! and removals. Only requirement labels are ever touched here; workflow and
//! terminal labels belong to the handlers.

use crate::effects::GitHubEffect;
use crate::types::{Label, LabelSet, PrNumber};

/// The label changes needed to reach the desired requirement set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPlan {
    /// Requirement labels to add, in label order.
    pub to_add: Vec<Label>,
    /// Requirement labels to remove, in label order.
    pub to_remove: Vec<Label>,
}

impl LabelPlan {
    pub fn compute(desired: &LabelSet, current: &LabelSet) -> Self {
        let desired = desired.requirements();
        let current = current.requirements();
        LabelPlan {
            to_add: desired.difference(&current),
            to_remove: current.difference(&desired),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn added(&self) -> LabelSet {
        self.to_add.iter().copied().collect()
    }

    /// The label set that results from applying this plan to `current`.
    pub fn apply_to(&self, current: &LabelSet) -> LabelSet {
        let mut next = current.clone();
        for label in &self.to_remove {
            next.remove(*label);
        }
        for label in &self.to_add {
            next.insert(*label);
        }
        next
    }

    /// Lowers the plan to effects: one batched addition, then one removal per
    /// label. GitHub's label removal endpoint takes a single label.
    pub fn effects(&self, pr: PrNumber) -> Vec<GitHubEffect> {
        let mut effects = Vec::with_capacity(1 + self.to_remove.len());
        if !self.to_add.is_empty() {
            effects.push(GitHubEffect::AddLabels {
                pr,
                labels: self.to_add.clone(),
            });
        }
        effects.extend(
            self.to_remove
                .iter()
                .map(|&label| GitHubEffect::RemoveLabel { pr, label }),
        );
        effects
    }
}
