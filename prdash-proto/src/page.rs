//! Pagination cursor and fetched page types.

use serde::{Deserialize, Serialize};

use crate::pr::PullRequest;

/// Continuation state returned alongside every fetched page.
///
/// Once `has_next_page` is `false` no further page is requested for the
/// section until it is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Opaque token to request the page after this one.
    pub start_cursor: String,
    /// Whether the server has more items past this page.
    pub has_next_page: bool,
}

impl PageInfo {
    /// Creates a cursor.
    pub fn new(start_cursor: impl Into<String>, has_next_page: bool) -> Self {
        Self {
            start_cursor: start_cursor.into(),
            has_next_page,
        }
    }
}

/// One page of pull requests as returned by the remote list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrPage {
    /// Items on this page, in server order.
    pub prs: Vec<PullRequest>,
    /// Server-reported size of the whole result set. Advisory only.
    pub total_count: usize,
    /// Cursor for the next page.
    pub page_info: PageInfo,
}
