//! Fetch task identity and the per-section admission gate.
//!
//! Every fetch gets a fresh [`TaskId`]. A section remembers only the id of
//! its most recently issued fetch; a completion carrying any other id is
//! stale and must not touch the section. The stale request is not
//! cancelled, it simply loses.

use std::fmt;

use uuid::Uuid;

use crate::section::SectionId;

/// Identifier of one issued fetch.
///
/// Built from the section id, the requested cursor and a UUID v7, which
/// embeds the issuance time plus random bits. Two calls to [`issue_task`]
/// never produce equal ids, even for the same section and cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an arbitrary id string. Used for non-fetch tasks.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues a new fetch task id for `section` requesting `cursor`.
#[must_use]
pub fn issue_task(section: SectionId, cursor: Option<&str>) -> TaskId {
    let cursor = cursor.unwrap_or("start");
    TaskId(format!("fetching_prs_{section}_{cursor}_{}", Uuid::now_v7()))
}

/// Last-writer-wins gate over a section's fetch completions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchGate {
    last_task_id: Option<TaskId>,
}

impl FetchGate {
    /// Records `task_id` as the only fetch whose result may be admitted.
    pub fn record_issued(&mut self, task_id: TaskId) {
        self.last_task_id = Some(task_id);
    }

    /// Whether a completion for `task_id` may mutate the section.
    #[must_use]
    pub fn admit(&self, task_id: &TaskId) -> bool {
        self.last_task_id.as_ref() == Some(task_id)
    }

    /// Forgets the last issued id so that every in-flight completion is stale.
    pub fn clear(&mut self) {
        self.last_task_id = None;
    }

    /// The most recently issued id, if any.
    #[must_use]
    pub const fn last_task_id(&self) -> Option<&TaskId> {
        self.last_task_id.as_ref()
    }
}
