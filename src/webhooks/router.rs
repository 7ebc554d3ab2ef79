//! Static routing of `(event kind, action)` pairs to handlers.
//!
//! | Event | Action | Handlers |
//! |-------|--------|----------|
//! | `pull_request` | `opened` | gatekeeper |
//! | `pull_request` | `synchronize` | gatekeeper |
//! | `pull_request` | `ready_for_review` | failing checks, gatekeeper |
//! | `pull_request` | `labeled`, `unlabeled` | manual label |
//! | `pull_request_review` | `submitted` | review state |
//!
//! Pairs missing from the table are ignored.

use serde::{Deserialize, Serialize};

use super::events::{Action, EventKind, PrAction, ReviewAction};

/// A handler the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Shape, open-PR cap, extensionless files, compliance, default label.
    GateKeeper,
    /// `tests are failing` on draft-to-ready transitions.
    FailingChecks,
    /// `awaiting review` upkeep after manual label edits.
    ManualLabel,
    /// Review submissions.
    ReviewState,
}

struct Route {
    kind: EventKind,
    action: Action,
    handlers: &'static [HandlerKind],
}

const ROUTES: &[Route] = &[
    Route {
        kind: EventKind::PullRequest,
        action: Action::Pr(PrAction::Opened),
        handlers: &[HandlerKind::GateKeeper],
    },
    Route {
        kind: EventKind::PullRequest,
        action: Action::Pr(PrAction::Synchronize),
        handlers: &[HandlerKind::GateKeeper],
    },
    Route {
        kind: EventKind::PullRequest,
        action: Action::Pr(PrAction::ReadyForReview),
        handlers: &[HandlerKind::FailingChecks, HandlerKind::GateKeeper],
    },
    Route {
        kind: EventKind::PullRequest,
        action: Action::Pr(PrAction::Labeled),
        handlers: &[HandlerKind::ManualLabel],
    },
    Route {
        kind: EventKind::PullRequest,
        action: Action::Pr(PrAction::Unlabeled),
        handlers: &[HandlerKind::ManualLabel],
    },
    Route {
        kind: EventKind::PullRequestReview,
        action: Action::Review(ReviewAction::Submitted),
        handlers: &[HandlerKind::ReviewState],
    },
];

/// The handlers for a pair, in execution order. Empty when unrouted.
pub fn route(kind: EventKind, action: Action) -> &'static [HandlerKind] {
    ROUTES
        .iter()
        .find(|route| route.kind == kind && route.action == action)
        .map_or(&[], |route| route.handlers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_for_review_runs_checks_before_compliance() {
        assert_eq!(
            route(EventKind::PullRequest, Action::Pr(PrAction::ReadyForReview)),
            &[HandlerKind::FailingChecks, HandlerKind::GateKeeper]
        );
    }

    #[test]
    fn unrouted_pairs_are_empty() {
        for action in [
            PrAction::Closed,
            PrAction::Reopened,
            PrAction::Edited,
            PrAction::ConvertedToDraft,
        ] {
            assert!(route(EventKind::PullRequest, Action::Pr(action)).is_empty());
        }
        assert!(
            route(
                EventKind::PullRequestReview,
                Action::Review(ReviewAction::Dismissed)
            )
            .is_empty()
        );
    }

    #[test]
    fn kind_and_action_must_both_match() {
        // A review action under the pull_request kind never matches.
        assert!(
            route(
                EventKind::PullRequest,
                Action::Review(ReviewAction::Submitted)
            )
            .is_empty()
        );
    }

    #[test]
    fn every_route_is_unique() {
        for (i, a) in ROUTES.iter().enumerate() {
            for b in &ROUTES[i + 1..] {
                assert!(!(a.kind == b.kind && a.action == b.action));
            }
        }
    }
}
