//! Sparse partial updates addressed to a single pull request.
//!
//! An [`UpdatePr`] carries one optional field per aspect. An absent field
//! leaves that aspect untouched, so `Some(false)` and "not specified" are
//! never confused. [`UpdatePr::changes`] flattens the present fields into
//! [`PrChange`] values in the order they are applied.

use serde::{Deserialize, Serialize};

use crate::pr::{Assignee, Comment, PrNumber};

/// One aspect of a pull request being changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrChange {
    /// `true` closes the pull request, `false` reopens it.
    ClosedStateChanged(bool),
    /// A comment was posted.
    CommentAdded(Comment),
    /// Assignees were added. Already present ones are skipped.
    AssigneesAdded(Vec<Assignee>),
    /// Assignees were removed.
    AssigneesRemoved(Vec<Assignee>),
    /// `true` marks a draft ready for review. `false` is a no-op: a ready
    /// pull request is never turned back into a draft by this event.
    ReadyForReview(bool),
    /// `true` marks the pull request merged. `false` is a no-op: a merge is
    /// never undone by this event.
    Merged(bool),
}

/// A partial patch for the pull request identified by `number`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePr {
    /// Target pull request.
    pub number: PrNumber,
    /// Close (`true`) or reopen (`false`).
    pub is_closed: Option<bool>,
    /// Comment to append.
    pub new_comment: Option<Comment>,
    /// Assignees to add.
    pub added_assignees: Option<Vec<Assignee>>,
    /// Assignees to remove.
    pub removed_assignees: Option<Vec<Assignee>>,
    /// Ready-for-review transition.
    pub ready_for_review: Option<bool>,
    /// Merge transition.
    pub is_merged: Option<bool>,
}

impl UpdatePr {
    /// An update for `number` that changes nothing yet.
    #[must_use]
    pub fn new(number: PrNumber) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Builds an update carrying a single change.
    #[must_use]
    pub fn single(number: PrNumber, change: PrChange) -> Self {
        Self::new(number).with(change)
    }

    /// Sets the field matching `change`, replacing any earlier value for it.
    #[must_use]
    pub fn with(mut self, change: PrChange) -> Self {
        match change {
            PrChange::ClosedStateChanged(v) => self.is_closed = Some(v),
            PrChange::CommentAdded(c) => self.new_comment = Some(c),
            PrChange::AssigneesAdded(a) => self.added_assignees = Some(a),
            PrChange::AssigneesRemoved(a) => self.removed_assignees = Some(a),
            PrChange::ReadyForReview(v) => self.ready_for_review = Some(v),
            PrChange::Merged(v) => self.is_merged = Some(v),
        }
        self
    }

    /// Present aspects in application order.
    ///
    /// Closed state comes before merge, so an update carrying both
    /// `is_closed` and `is_merged = true` ends up merged.
    #[must_use]
    pub fn changes(&self) -> Vec<PrChange> {
        let mut out = Vec::new();
        if let Some(v) = self.is_closed {
            out.push(PrChange::ClosedStateChanged(v));
        }
        if let Some(c) = &self.new_comment {
            out.push(PrChange::CommentAdded(c.clone()));
        }
        if let Some(a) = &self.added_assignees {
            out.push(PrChange::AssigneesAdded(a.clone()));
        }
        if let Some(a) = &self.removed_assignees {
            out.push(PrChange::AssigneesRemoved(a.clone()));
        }
        if let Some(v) = self.ready_for_review {
            out.push(PrChange::ReadyForReview(v));
        }
        if let Some(v) = self.is_merged {
            out.push(PrChange::Merged(v));
        }
        out
    }

    /// Whether the update carries no aspect at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_closed.is_none()
            && self.new_comment.is_none()
            && self.added_assignees.is_none()
            && self.removed_assignees.is_none()
            && self.ready_for_review.is_none()
            && self.is_merged.is_none()
    }
}
