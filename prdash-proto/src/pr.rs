//! Pull request records as held by a section's entity store.
//!
//! A [`PullRequest`] is identified by its `number`. Everything else on it
//! may be replaced by a fresher fetch or patched in place by an
//! [`UpdatePr`](crate::update::UpdatePr).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a pull request within a section.
pub type PrNumber = u64;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrState {
    /// Open and accepting changes.
    #[default]
    Open,
    /// Closed without merging.
    Closed,
    /// Merged into its base branch.
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Merged => write!(f, "MERGED"),
        }
    }
}

/// A user assigned to a pull request.
///
/// Two assignees are the same assignee iff they are structurally equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignee {
    /// Login handle.
    pub login: String,
}

impl Assignee {
    /// Creates an assignee from a login handle.
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

/// A comment left on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Login of the comment author.
    pub author: String,
    /// Comment text.
    pub body: String,
    /// When the comment was posted.
    pub updated_at: DateTime<Utc>,
}

/// One pull request as shown in a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number, unique within a section.
    pub number: PrNumber,
    /// Title line.
    pub title: String,
    /// `owner/name` of the repository.
    pub repository: String,
    /// Login of the author.
    pub author: String,
    /// Lifecycle state.
    #[serde(default)]
    pub state: PrState,
    /// Whether the pull request is still a draft.
    #[serde(default)]
    pub is_draft: bool,
    /// Mergeability as reported by the server (e.g. `MERGEABLE`).
    /// Empty once merged.
    #[serde(default)]
    pub mergeable: String,
    /// Assignees in display order, no two structurally equal.
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    /// Comments in posting order.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Last time the pull request changed upstream.
    pub updated_at: DateTime<Utc>,
    /// Lines added.
    #[serde(default)]
    pub additions: u64,
    /// Lines removed.
    #[serde(default)]
    pub deletions: u64,
}

impl PullRequest {
    /// Creates an open, non-draft pull request with no assignees or comments.
    #[must_use]
    pub fn new(
        number: PrNumber,
        title: impl Into<String>,
        repository: impl Into<String>,
        author: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            number,
            title: title.into(),
            repository: repository.into(),
            author: author.into(),
            state: PrState::Open,
            is_draft: false,
            mergeable: String::new(),
            assignees: Vec::new(),
            comments: Vec::new(),
            updated_at,
            additions: 0,
            deletions: 0,
        }
    }
}
