//! User-triggered remote actions on a pull request.
//!
//! An action (close, merge, comment, ...) runs on a background task through
//! a [`PrActions`] backend. When it succeeds the handler synthesizes the
//! [`UpdatePr`] that mirrors the change locally and posts it back as
//! [`AppEvent::ActionCompleted`], so the section is patched without a
//! re-fetch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use prdash_proto::pr::{Assignee, Comment, PrNumber};
use prdash_proto::update::{PrChange, UpdatePr};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::event::AppEvent;
use crate::section::SectionId;
use crate::tasks::{Task, TaskId};

/// Errors returned by a [`PrActions`] backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The pull request does not exist remotely.
    #[error("pull request #{0} not found")]
    NotFound(PrNumber),

    /// The remote refused the action (e.g. merging a closed pull request).
    #[error("action rejected: {0}")]
    Rejected(String),

    /// Any other remote failure.
    #[error("remote error: {0}")]
    Remote(String),
}

/// An action on a single pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrAction {
    /// Close without merging.
    Close,
    /// Reopen a closed pull request.
    Reopen,
    /// Mark a draft ready for review.
    Ready,
    /// Merge.
    Merge,
    /// Post a comment.
    Comment(String),
    /// Add assignees by login.
    Assign(Vec<String>),
    /// Remove assignees by login.
    Unassign(Vec<String>),
}

impl PrAction {
    /// Whether the UI asks for a Y/N confirmation before running it.
    #[must_use]
    pub const fn needs_confirmation(&self) -> bool {
        matches!(self, Self::Close | Self::Reopen | Self::Ready | Self::Merge)
    }

    /// Short name used in prompts and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Reopen => "reopen",
            Self::Ready => "ready",
            Self::Merge => "merge",
            Self::Comment(_) => "comment",
            Self::Assign(_) => "assign",
            Self::Unassign(_) => "unassign",
        }
    }

    /// Status bar text while the action runs.
    #[must_use]
    pub fn start_text(&self, number: PrNumber) -> String {
        match self {
            Self::Close => format!("Closing PR #{number}"),
            Self::Reopen => format!("Reopening PR #{number}"),
            Self::Ready => format!("Marking PR #{number} as ready for review"),
            Self::Merge => format!("Merging PR #{number}"),
            Self::Comment(_) => format!("Commenting on PR #{number}"),
            Self::Assign(_) => format!("Assigning PR #{number}"),
            Self::Unassign(_) => format!("Unassigning PR #{number}"),
        }
    }

    /// Status bar text once the action succeeded.
    #[must_use]
    pub fn finished_text(&self, number: PrNumber) -> String {
        match self {
            Self::Close => format!("PR #{number} has been closed"),
            Self::Reopen => format!("PR #{number} has been reopened"),
            Self::Ready => format!("PR #{number} has been marked as ready for review"),
            Self::Merge => format!("PR #{number} has been merged"),
            Self::Comment(_) => format!("Commented on PR #{number}"),
            Self::Assign(_) => format!("PR #{number} has been assigned"),
            Self::Unassign(_) => format!("PR #{number} has been unassigned"),
        }
    }

    /// The local patch equivalent to this action having succeeded.
    ///
    /// `viewer` authors posted comments; `now` timestamps them.
    #[must_use]
    pub fn to_update(&self, number: PrNumber, viewer: &str, now: DateTime<Utc>) -> UpdatePr {
        let change = match self {
            Self::Close => PrChange::ClosedStateChanged(true),
            Self::Reopen => PrChange::ClosedStateChanged(false),
            Self::Ready => PrChange::ReadyForReview(true),
            Self::Merge => PrChange::Merged(true),
            Self::Comment(body) => PrChange::CommentAdded(Comment {
                author: viewer.to_string(),
                body: body.clone(),
                updated_at: now,
            }),
            Self::Assign(logins) => {
                PrChange::AssigneesAdded(logins.iter().map(Assignee::new).collect())
            }
            Self::Unassign(logins) => {
                PrChange::AssigneesRemoved(logins.iter().map(Assignee::new).collect())
            }
        };
        UpdatePr::single(number, change)
    }
}

/// An action issued from a section, ready to be run.
#[derive(Debug, Clone)]
pub struct ActionCommand {
    /// Section showing the pull request.
    pub section_id: SectionId,
    /// Target pull request.
    pub number: PrNumber,
    /// `owner/name` of its repository.
    pub repository: String,
    /// What to do.
    pub action: PrAction,
    /// Task tracking the action.
    pub task: Task,
}

impl ActionCommand {
    /// Builds a command with a fresh task.
    #[must_use]
    pub fn new(
        section_id: SectionId,
        number: PrNumber,
        repository: impl Into<String>,
        action: PrAction,
    ) -> Self {
        let task = Task::started(
            TaskId::new(format!("{}_pr_{number}_{}", action.name(), Uuid::now_v7())),
            action.start_text(number),
            action.finished_text(number),
        );
        Self {
            section_id,
            number,
            repository: repository.into(),
            action,
            task,
        }
    }
}

/// Async capability performing actions remotely.
pub trait PrActions: Send + Sync {
    /// Login of the authenticated user.
    fn viewer(&self) -> &str;

    /// Performs `action` on pull request `number` in `repository`.
    fn perform(
        &self,
        repository: &str,
        number: PrNumber,
        action: &PrAction,
    ) -> impl std::future::Future<Output = Result<(), ActionError>> + Send;
}

/// Runs `command` against `backend` on a background task.
///
/// Posts [`AppEvent::ActionCompleted`] with the synthesized patch on
/// success or the error on failure.
pub fn spawn_action<A>(
    backend: Arc<A>,
    command: ActionCommand,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()>
where
    A: PrActions + 'static,
{
    tokio::spawn(async move {
        let ActionCommand {
            section_id,
            number,
            repository,
            action,
            task,
        } = command;
        tracing::info!(section_id, number, action = action.name(), "running action");

        let outcome = backend
            .perform(&repository, number, &action)
            .await
            .map(|()| action.to_update(number, backend.viewer(), Utc::now()));
        if let Err(e) = &outcome {
            tracing::warn!(number, action = action.name(), error = %e, "action failed");
        }

        let event = AppEvent::ActionCompleted {
            section_id,
            task_id: task.id,
            outcome,
        };
        if tx.send(event).await.is_err() {
            tracing::debug!(section_id, "event loop gone, dropping action result");
        }
    })
}
