//! Program-wide record of asynchronous tasks for the status bar.

use std::collections::HashMap;

use chrono::{DateTime, Local, TimeDelta};

use super::TaskId;

/// Settled tasks kept on the board; older ones are dropped.
pub const MAX_SETTLED: usize = 32;

/// Progress of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Issued, no completion seen yet.
    Started,
    /// Completed successfully.
    Finished,
    /// Completed with an error.
    Error(String),
}

/// One asynchronous operation shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique id.
    pub id: TaskId,
    /// Text shown while the task runs (e.g. `Fetching PRs for "Mine"`).
    pub start_text: String,
    /// Text shown once it finished.
    pub finished_text: String,
    /// Current progress.
    pub state: TaskState,
    /// When the task was started.
    pub started_at: DateTime<Local>,
}

impl Task {
    /// Creates a task in the [`TaskState::Started`] state.
    pub fn started(
        id: TaskId,
        start_text: impl Into<String>,
        finished_text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            start_text: start_text.into(),
            finished_text: finished_text.into(),
            state: TaskState::Started,
            started_at: Local::now(),
        }
    }

    /// Time since the task was started.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Local>) -> TimeDelta {
        now - self.started_at
    }

    /// Whether a completion has been recorded.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state != TaskState::Started
    }

    /// The line to display for the task's current state.
    #[must_use]
    pub fn status_text(&self) -> String {
        match &self.state {
            TaskState::Started => self.start_text.clone(),
            TaskState::Finished => self.finished_text.clone(),
            TaskState::Error(err) => format!("{} failed: {err}", self.start_text),
        }
    }
}

/// Tasks of this run, keyed by id. Running tasks are always kept; only the
/// latest [`MAX_SETTLED`] settled ones are.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: HashMap<TaskId, Task>,
    /// Ids in the order their state last changed; the back is the latest.
    recent: Vec<TaskId>,
}

impl TaskBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a started task.
    pub fn start(&mut self, task: Task) {
        self.touch(&task.id);
        self.tasks.insert(task.id.clone(), task);
    }

    /// Marks a task finished. Returns `false` for an unknown id.
    pub fn finish(&mut self, id: &TaskId) -> bool {
        self.set_state(id, TaskState::Finished)
    }

    /// Marks a task failed with `error`. Returns `false` for an unknown id.
    pub fn fail(&mut self, id: &TaskId, error: impl Into<String>) -> bool {
        self.set_state(id, TaskState::Error(error.into()))
    }

    /// Looks up a task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// The task whose state changed most recently.
    #[must_use]
    pub fn latest(&self) -> Option<&Task> {
        self.recent.last().and_then(|id| self.tasks.get(id))
    }

    /// Number of tasks still in [`TaskState::Started`].
    #[must_use]
    pub fn in_progress(&self) -> usize {
        self.tasks
            .values()
            .filter(|t| t.state == TaskState::Started)
            .count()
    }

    fn set_state(&mut self, id: &TaskId, state: TaskState) -> bool {
        let Some(task) = self.tasks.get_mut(id) else {
            return false;
        };
        task.state = state;
        self.touch(id);
        self.prune();
        true
    }

    /// Drops the oldest settled tasks beyond [`MAX_SETTLED`].
    fn prune(&mut self) {
        let tasks = &mut self.tasks;
        let settled = self
            .recent
            .iter()
            .filter(|id| tasks.get(*id).is_some_and(Task::is_settled))
            .count();
        let mut excess = settled.saturating_sub(MAX_SETTLED);
        if excess == 0 {
            return;
        }
        self.recent.retain(|id| {
            if excess > 0 && tasks.get(id).is_some_and(Task::is_settled) {
                tasks.remove(id);
                excess -= 1;
                false
            } else {
                true
            }
        });
    }

    fn touch(&mut self, id: &TaskId) {
        self.recent.retain(|r| r != id);
        self.recent.push(id.clone());
    }
}
