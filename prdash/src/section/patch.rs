//! Applies sparse [`UpdatePr`] events to a section's entity store.
//!
//! Updates arrive outside the fetch pipeline (after a close, merge,
//! comment, ... succeeded remotely) and are never gated by task id. An
//! update for a number the store does not hold is ignored.

use prdash_proto::pr::{Assignee, PrState, PullRequest};
use prdash_proto::update::{PrChange, UpdatePr};

use super::store::EntityStore;

/// Applies every present aspect of `update` to its target.
///
/// Returns `true` if the target was found and patched, `false` if no
/// record with that number is held.
pub fn apply(store: &mut EntityStore, update: &UpdatePr) -> bool {
    let Some(pr) = store.get_mut(update.number) else {
        return false;
    };
    for change in update.changes() {
        apply_change(pr, change);
    }
    true
}

/// Applies a single aspect to `pr`.
pub fn apply_change(pr: &mut PullRequest, change: PrChange) {
    match change {
        PrChange::ClosedStateChanged(closed) => {
            pr.state = if closed { PrState::Closed } else { PrState::Open };
        }
        PrChange::CommentAdded(comment) => pr.comments.push(comment),
        PrChange::AssigneesAdded(added) => {
            pr.assignees = add_assignees(&pr.assignees, &added);
        }
        PrChange::AssigneesRemoved(removed) => {
            pr.assignees = remove_assignees(&pr.assignees, &removed);
        }
        PrChange::ReadyForReview(ready) => {
            if ready {
                pr.is_draft = false;
            }
        }
        PrChange::Merged(merged) => {
            if merged {
                pr.state = PrState::Merged;
                pr.mergeable.clear();
            }
        }
    }
}

/// `current` followed by each entry of `added` not already present.
///
/// Existing order is kept and new entries keep their relative order. An
/// entry repeated inside `added` is only taken once.
#[must_use]
pub fn add_assignees(current: &[Assignee], added: &[Assignee]) -> Vec<Assignee> {
    let mut out = current.to_vec();
    for assignee in added {
        if !out.contains(assignee) {
            out.push(assignee.clone());
        }
    }
    out
}

/// Entries of `current` not equal to any entry of `removed`, order kept.
#[must_use]
pub fn remove_assignees(current: &[Assignee], removed: &[Assignee]) -> Vec<Assignee> {
    current
        .iter()
        .filter(|a| !removed.contains(a))
        .cloned()
        .collect()
}
