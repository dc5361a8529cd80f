//! Remote list fetch capability.
//!
//! Defines the [`PrFetcher`] trait the sections page through, and
//! [`spawn_fetch`], which runs one fetch on a tokio task and posts the
//! result back into the event queue. [`fixture::FixtureBackend`] is the
//! in-memory implementation, optionally loaded from a JSON file.

pub mod fixture;

use std::sync::Arc;

use prdash_proto::page::PrPage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::{AppEvent, FetchCompleted};
use crate::section::SectionId;
use crate::tasks::Task;

/// Errors returned by a [`PrFetcher`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The remote side answered with an error.
    #[error("remote error: {0}")]
    Remote(String),

    /// The cursor was not issued by this backend.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// The backend went away before answering.
    #[error("fetch backend closed")]
    Closed,

    /// Reading fixture data failed.
    #[error("fixture I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fixture data was not valid JSON.
    #[error("fixture decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Parameters of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Search filters, e.g. `is:open author:@me`.
    pub filters: String,
    /// Maximum number of items on the page.
    pub limit: usize,
    /// Cursor of the previous page, `None` for the first page.
    pub cursor: Option<String>,
}

/// A fetch issued by a section, ready to be run.
#[derive(Debug, Clone)]
pub struct FetchCommand {
    /// Section that issued the fetch.
    pub section_id: SectionId,
    /// Task tracking the fetch; its id is the section's new gate value.
    pub task: Task,
    /// What to ask the backend for.
    pub request: PageRequest,
}

/// Async capability that returns one page of pull requests.
///
/// Called at most once per issued task. A call that never resolves leaves
/// its task started forever; no timeout is applied here.
pub trait PrFetcher: Send + Sync {
    /// Fetches the page described by `request`.
    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl std::future::Future<Output = Result<PrPage, FetchError>> + Send;
}

/// Runs `command` against `fetcher` on a background task.
///
/// The outcome, success or failure, is posted to `tx` as
/// [`AppEvent::FetchCompleted`] tagged with the command's task id. Section
/// state is never touched from here.
pub fn spawn_fetch<F>(
    fetcher: Arc<F>,
    command: FetchCommand,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()>
where
    F: PrFetcher + 'static,
{
    tokio::spawn(async move {
        let FetchCommand {
            section_id,
            task,
            request,
        } = command;
        tracing::debug!(section_id, task_id = %task.id, cursor = ?request.cursor, "fetching page");

        let outcome = fetcher.fetch_page(&request).await;
        if let Err(e) = &outcome {
            tracing::warn!(section_id, task_id = %task.id, error = %e, "fetch failed");
        }

        let event = AppEvent::FetchCompleted(FetchCompleted {
            section_id,
            task_id: task.id,
            outcome,
        });
        if tx.send(event).await.is_err() {
            tracing::debug!(section_id, "event loop gone, dropping fetch result");
        }
    })
}
