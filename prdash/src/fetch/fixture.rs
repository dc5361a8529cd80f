//! In-memory pull request backend.
//!
//! Serves pages out of a list held in memory, either built in code or
//! loaded from a JSON array of pull requests. Filters understand a small
//! subset of the search syntax: `is:open|closed|merged|draft`,
//! `author:`, `assignee:`, `involves:`, `repo:` (each negatable with a
//! leading `-`, `@me` meaning the viewer) and free words matched against
//! titles. Other qualifiers are accepted and ignored. Cursors encode the
//! offset of the next page.
//!
//! The same list backs [`PrActions`], so actions change what later fetches
//! return.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use prdash_proto::page::{PageInfo, PrPage};
use prdash_proto::pr::{Assignee, PrNumber, PrState, PullRequest};

use super::{FetchError, PageRequest, PrFetcher};
use crate::actions::{ActionError, PrAction, PrActions};
use crate::section::patch;

const CURSOR_PREFIX: &str = "offset:";

/// Pull request list served from memory.
pub struct FixtureBackend {
    viewer: String,
    prs: RwLock<Vec<PullRequest>>,
}

impl FixtureBackend {
    /// Creates a backend serving `prs` to `viewer`.
    pub fn new(viewer: impl Into<String>, prs: Vec<PullRequest>) -> Self {
        Self {
            viewer: viewer.into(),
            prs: RwLock::new(prs),
        }
    }

    /// Loads pull requests from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] if `json` is not a list of pull requests.
    pub fn from_json_str(viewer: impl Into<String>, json: &str) -> Result<Self, FetchError> {
        let prs: Vec<PullRequest> = serde_json::from_str(json)?;
        Ok(Self::new(viewer, prs))
    }

    /// Loads pull requests from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Io`] if the file cannot be read or
    /// [`FetchError::Decode`] if it is not a list of pull requests.
    pub fn from_json_file(viewer: impl Into<String>, path: &Path) -> Result<Self, FetchError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(viewer, &contents)
    }

    /// A backend with generated sample data for offline use.
    #[must_use]
    pub fn demo(viewer: &str, now: DateTime<Utc>) -> Self {
        let repos = ["acme/api", "acme/web", "acme/cli"];
        let authors = [viewer, "alice", "bob", "carol"];
        let titles = [
            "Fix flaky pagination test",
            "Add retry to webhook delivery",
            "Bump tokio to 1.x",
            "Refactor config loading",
            "Support dark theme",
            "Document release process",
            "Cache search results",
            "Drop legacy auth endpoint",
        ];
        let prs = (0u32..40)
            .map(|i| {
                let idx = i as usize;
                let mut pr = PullRequest::new(
                    u64::from(1000 - i),
                    titles[idx % titles.len()],
                    repos[idx % repos.len()],
                    authors[idx % authors.len()],
                    now - Duration::hours(i64::from(i * 7)),
                );
                pr.is_draft = i % 5 == 0;
                pr.mergeable = "MERGEABLE".to_string();
                pr.additions = u64::from(i * 13 % 400);
                pr.deletions = u64::from(i * 7 % 150);
                if i % 3 == 0 {
                    pr.assignees.push(Assignee::new(authors[(idx + 1) % authors.len()]));
                }
                pr
            })
            .collect();
        Self::new(viewer, prs)
    }

    /// Snapshot of the held list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PullRequest> {
        self.prs.read().clone()
    }

    fn page(&self, request: &PageRequest) -> Result<PrPage, FetchError> {
        let offset = match &request.cursor {
            None => 0,
            Some(cursor) => parse_cursor(cursor)?,
        };
        let filter = Filter::parse(&request.filters, &self.viewer);

        let mut matching: Vec<PullRequest> = self
            .prs
            .read()
            .iter()
            .filter(|pr| filter.matches(pr))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let total_count = matching.len();
        let end = offset.saturating_add(request.limit).min(total_count);
        let prs = matching
            .get(offset.min(total_count)..end)
            .map(<[PullRequest]>::to_vec)
            .unwrap_or_default();

        Ok(PrPage {
            prs,
            total_count,
            page_info: PageInfo::new(format!("{CURSOR_PREFIX}{end}"), end < total_count),
        })
    }
}

impl PrFetcher for FixtureBackend {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PrPage, FetchError> {
        self.page(request)
    }
}

impl PrActions for FixtureBackend {
    fn viewer(&self) -> &str {
        &self.viewer
    }

    async fn perform(
        &self,
        repository: &str,
        number: PrNumber,
        action: &PrAction,
    ) -> Result<(), ActionError> {
        let mut prs = self.prs.write();
        let pr = prs
            .iter_mut()
            .find(|p| p.number == number && p.repository == repository)
            .ok_or(ActionError::NotFound(number))?;

        match (action, pr.state) {
            (PrAction::Merge, PrState::Closed | PrState::Merged) => {
                return Err(ActionError::Rejected(format!(
                    "cannot merge a {} pull request",
                    pr.state
                )));
            }
            (PrAction::Reopen, PrState::Merged) => {
                return Err(ActionError::Rejected(
                    "cannot reopen a merged pull request".to_string(),
                ));
            }
            _ => {}
        }

        for change in action.to_update(number, &self.viewer, Utc::now()).changes() {
            patch::apply_change(pr, change);
        }
        pr.updated_at = Utc::now();
        Ok(())
    }
}

fn parse_cursor(cursor: &str) -> Result<usize, FetchError> {
    cursor
        .strip_prefix(CURSOR_PREFIX)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| FetchError::InvalidCursor(cursor.to_string()))
}

/// One qualifier of a search string.
#[derive(Debug, PartialEq, Eq)]
enum Term {
    State(PrState),
    Draft,
    Author(String),
    Assignee(String),
    Involves(String),
    Repo(String),
    Word(String),
}

#[derive(Debug, Default)]
struct Filter {
    terms: Vec<(bool, Term)>,
}

impl Filter {
    fn parse(filters: &str, viewer: &str) -> Self {
        let resolve = |v: &str| {
            if v == "@me" {
                viewer.to_string()
            } else {
                v.to_string()
            }
        };
        let terms = filters
            .split_whitespace()
            .filter_map(|token| {
                let (negated, token) = token
                    .strip_prefix('-')
                    .map_or((false, token), |rest| (true, rest));
                let term = match token.split_once(':') {
                    Some(("is", "open")) => Term::State(PrState::Open),
                    Some(("is", "closed")) => Term::State(PrState::Closed),
                    Some(("is", "merged")) => Term::State(PrState::Merged),
                    Some(("is", "draft")) => Term::Draft,
                    Some(("author", v)) => Term::Author(resolve(v)),
                    Some(("assignee", v)) => Term::Assignee(resolve(v)),
                    Some(("involves", v)) => Term::Involves(resolve(v)),
                    Some(("repo", v)) => Term::Repo(v.to_string()),
                    Some(_) => return None,
                    None => Term::Word(token.to_lowercase()),
                };
                Some((negated, term))
            })
            .collect();
        Self { terms }
    }

    fn matches(&self, pr: &PullRequest) -> bool {
        self.terms.iter().all(|(negated, term)| {
            let hit = match term {
                Term::State(state) => pr.state == *state,
                Term::Draft => pr.is_draft,
                Term::Author(login) => pr.author == *login,
                Term::Assignee(login) => pr.assignees.iter().any(|a| a.login == *login),
                Term::Involves(login) => {
                    pr.author == *login
                        || pr.assignees.iter().any(|a| a.login == *login)
                        || pr.comments.iter().any(|c| c.author == *login)
                }
                Term::Repo(repo) => pr.repository == *repo,
                Term::Word(word) => pr.title.to_lowercase().contains(word),
            };
            hit != *negated
        })
    }
}
