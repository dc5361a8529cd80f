//! Events posted into the application's single inbound queue.
//!
//! Background fetches and actions never touch section state. They send an
//! [`AppEvent`] instead, and the event loop applies it in arrival order.
//!
//! ```text
//! event loop (owns sections)  ←── AppEvent ───  tokio tasks (fetch / action)
//! ```

use prdash_proto::page::PrPage;
use prdash_proto::update::UpdatePr;

use crate::actions::ActionError;
use crate::fetch::FetchError;
use crate::section::SectionId;
use crate::tasks::TaskId;

/// Completion of one issued fetch.
#[derive(Debug)]
pub struct FetchCompleted {
    /// Section that issued the fetch.
    pub section_id: SectionId,
    /// Task id the fetch was issued under.
    pub task_id: TaskId,
    /// The fetched page or the failure.
    pub outcome: Result<PrPage, FetchError>,
}

/// Inbound messages for the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A page fetch finished.
    FetchCompleted(FetchCompleted),
    /// A remote action finished. On success it carries the patch that
    /// mirrors the action locally.
    ActionCompleted {
        /// Section showing the target pull request.
        section_id: SectionId,
        /// Task the action ran under.
        task_id: TaskId,
        /// The patch to apply, or the failure.
        outcome: Result<UpdatePr, ActionError>,
    },
    /// A pushed partial update for a pull request in `section_id`.
    EntityPatched {
        /// Section holding the pull request.
        section_id: SectionId,
        /// The patch.
        update: UpdatePr,
    },
}
