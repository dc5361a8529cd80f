//! Asynchronous task tracking.
//!
//! [`tracker`] issues fetch ids and gates which completion may mutate a
//! section. [`board`] keeps the user-visible status of every task.

pub mod board;
pub mod tracker;

pub use board::{Task, TaskBoard, TaskState};
pub use tracker::{FetchGate, TaskId, issue_task};
