//! A section: one independently fetched and displayed pull request list.
//!
//! The section owns its entity store, its pagination cursor and the
//! last-issued fetch id. All mutation happens on the event loop:
//!
//! 1. [`Section::fetch_next_page`] issues a task and returns the request to
//!    run, or `None` once the last page has been seen.
//! 2. The fetch runs elsewhere and comes back as an event.
//! 3. [`Section::apply_fetched`] merges it only if its task id is still the
//!    latest one issued; otherwise the result is dropped.
//!
//! Pushed updates go through [`Section::apply_update`] without any gate.

pub mod patch;
pub mod store;
pub mod view;

use chrono::{DateTime, Local, Utc};
use prdash_proto::page::{PageInfo, PrPage};
use prdash_proto::pr::PullRequest;
use prdash_proto::update::UpdatePr;

use crate::config::SectionConfig;
use crate::fetch::{FetchCommand, PageRequest};
use crate::tasks::{FetchGate, Task, TaskId, issue_task};

pub use store::EntityStore;
pub use view::{PrRow, RowState, build_rows};

/// Index of a section in the dashboard. Stable for the section's lifetime.
pub type SectionId = usize;

/// State of one section.
#[derive(Debug, Clone)]
pub struct Section {
    id: SectionId,
    config: SectionConfig,
    /// Committed search filters; starts as the configured filters.
    search_value: String,
    store: EntityStore,
    total_count: usize,
    /// `None` until the first page is merged.
    page_info: Option<PageInfo>,
    gate: FetchGate,
    /// Whether the latest issued fetch has not completed yet.
    in_flight: bool,
    selection: usize,
    rows: Vec<PrRow>,
    last_updated: Option<DateTime<Local>>,
}

impl Section {
    /// Creates an empty, never fetched section.
    #[must_use]
    pub fn new(id: SectionId, config: SectionConfig) -> Self {
        Self {
            id,
            search_value: config.filters.clone(),
            config,
            store: EntityStore::new(),
            total_count: 0,
            page_info: None,
            gate: FetchGate::default(),
            in_flight: false,
            selection: 0,
            rows: Vec::new(),
            last_updated: None,
        }
    }

    /// Issues the fetch for the next page.
    ///
    /// Returns `None` when the previous page reported no next page. A
    /// section without a cursor asks for the first page. The returned
    /// command's task id becomes the only one [`apply_fetched`] accepts.
    ///
    /// [`apply_fetched`]: Self::apply_fetched
    pub fn fetch_next_page(&mut self, default_limit: usize) -> Option<FetchCommand> {
        if self.page_info.as_ref().is_some_and(|p| !p.has_next_page) {
            tracing::debug!(section_id = self.id, "no next page, skipping fetch");
            return None;
        }

        let cursor = self.page_info.as_ref().map(|p| p.start_cursor.clone());
        let task_id = issue_task(self.id, cursor.as_deref());
        self.gate.record_issued(task_id.clone());
        self.in_flight = true;

        let title = &self.config.title;
        let task = Task::started(
            task_id,
            format!("Fetching PRs for \"{title}\""),
            format!("PRs for \"{title}\" have been fetched"),
        );
        Some(FetchCommand {
            section_id: self.id,
            task,
            request: PageRequest {
                filters: self.search_value.clone(),
                limit: self.config.limit.unwrap_or(default_limit),
                cursor,
            },
        })
    }

    /// Whether a completion for `task_id` may mutate this section.
    #[must_use]
    pub fn admit(&self, task_id: &TaskId) -> bool {
        self.gate.admit(task_id)
    }

    /// Merges a fetched page if `task_id` is the latest issued fetch.
    ///
    /// The first page replaces the items, later pages are appended. Count
    /// and cursor are overwritten. Returns whether the page was admitted.
    pub fn apply_fetched(&mut self, task_id: &TaskId, page: PrPage, now: DateTime<Utc>) -> bool {
        if !self.admit(task_id) {
            tracing::debug!(section_id = self.id, %task_id, "discarding stale fetch result");
            return false;
        }

        let received = page.prs.len();
        if self.page_info.is_some() {
            self.store.append(page.prs);
        } else {
            self.store.replace_all(page.prs);
        }
        self.total_count = page.total_count;
        self.page_info = Some(page.page_info);
        self.in_flight = false;
        self.last_updated = Some(now.with_timezone(&Local));
        self.clamp_selection();
        self.rebuild_rows(now);

        tracing::info!(
            section_id = self.id,
            received,
            held = self.store.len(),
            total = self.total_count,
            "merged fetched page"
        );
        true
    }

    /// Records a failed fetch. The store is left untouched.
    ///
    /// Returns whether the failure belonged to the latest issued fetch.
    pub fn apply_failed(&mut self, task_id: &TaskId) -> bool {
        if !self.admit(task_id) {
            return false;
        }
        self.in_flight = false;
        true
    }

    /// Applies a pushed partial update and rebuilds rows.
    ///
    /// Returns `false` if the target is not held by this section.
    pub fn apply_update(&mut self, update: &UpdatePr, now: DateTime<Utc>) -> bool {
        let applied = patch::apply(&mut self.store, update);
        if applied {
            self.rebuild_rows(now);
        }
        applied
    }

    /// Clears items, cursor, selection and the fetch gate.
    ///
    /// Configuration and the committed search are kept, so the next
    /// [`fetch_next_page`](Self::fetch_next_page) starts from the first
    /// page with the same filters. Results of fetches issued before the
    /// reset are dropped.
    pub fn reset(&mut self) {
        self.store.clear();
        self.rows.clear();
        self.total_count = 0;
        self.page_info = None;
        self.gate.clear();
        self.in_flight = false;
        self.selection = 0;
    }

    /// Commits a new search. Callers reset and re-fetch afterwards.
    pub fn set_search_value(&mut self, value: impl Into<String>) {
        self.search_value = value.into();
    }

    /// Moves the selection one row down, stopping at the last row.
    pub fn select_next(&mut self, now: DateTime<Utc>) {
        if self.selection + 1 < self.store.len() {
            self.selection += 1;
            self.rebuild_rows(now);
        }
    }

    /// Moves the selection one row up, stopping at the first row.
    pub fn select_prev(&mut self, now: DateTime<Utc>) {
        if self.selection > 0 {
            self.selection -= 1;
            self.rebuild_rows(now);
        }
    }

    /// Recomputes the cached rows from the store and selection.
    pub fn rebuild_rows(&mut self, now: DateTime<Utc>) {
        self.rows = build_rows(self.store.as_slice(), self.selection, now);
    }

    fn clamp_selection(&mut self) {
        self.selection = self.selection.min(self.store.len().saturating_sub(1));
    }

    /// Section id.
    #[must_use]
    pub const fn id(&self) -> SectionId {
        self.id
    }

    /// Section title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Section configuration.
    #[must_use]
    pub const fn config(&self) -> &SectionConfig {
        &self.config
    }

    /// Filters used by the next fetch.
    #[must_use]
    pub fn search_value(&self) -> &str {
        &self.search_value
    }

    /// Held pull requests in store order.
    #[must_use]
    pub fn items(&self) -> &[PullRequest] {
        self.store.as_slice()
    }

    /// Server-reported total, advisory only.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    /// Cursor of the last merged page, `None` if never fetched.
    #[must_use]
    pub const fn page_info(&self) -> Option<&PageInfo> {
        self.page_info.as_ref()
    }

    /// Id of the latest issued fetch.
    #[must_use]
    pub const fn last_task_id(&self) -> Option<&TaskId> {
        self.gate.last_task_id()
    }

    /// Whether the latest issued fetch is still outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Whether another page may be requested.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_none_or(|p| p.has_next_page)
    }

    /// Selected row index.
    #[must_use]
    pub const fn selection(&self) -> usize {
        self.selection
    }

    /// Pull request under the selection.
    #[must_use]
    pub fn current_pr(&self) -> Option<&PullRequest> {
        self.store.at(self.selection)
    }

    /// Render rows as of the last rebuild.
    #[must_use]
    pub fn rows(&self) -> &[PrRow] {
        &self.rows
    }

    /// When a page was last merged.
    #[must_use]
    pub const fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }
}
