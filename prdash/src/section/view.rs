//! Render-ready rows derived from a section's store.

use chrono::{DateTime, Utc};
use prdash_proto::pr::{PrNumber, PrState, PullRequest};

/// Display state of a row, folding the draft flag into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// Open and ready.
    Open,
    /// Open draft.
    Draft,
    /// Closed unmerged.
    Closed,
    /// Merged.
    Merged,
}

impl RowState {
    fn of(pr: &PullRequest) -> Self {
        match pr.state {
            PrState::Open if pr.is_draft => Self::Draft,
            PrState::Open => Self::Open,
            PrState::Closed => Self::Closed,
            PrState::Merged => Self::Merged,
        }
    }

    /// Glyph shown in the state column.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Open => "\u{25cb}",
            Self::Draft => "\u{25cc}",
            Self::Closed => "\u{2717}",
            Self::Merged => "\u{2713}",
        }
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRow {
    /// Number of the pull request behind the row.
    pub number: PrNumber,
    /// Whether this is the row under the selection cursor.
    pub selected: bool,
    /// Age since last update, e.g. `3h`.
    pub updated: String,
    /// Display state.
    pub state: RowState,
    /// `owner/name`.
    pub repo: String,
    /// `#12 Title`.
    pub title: String,
    /// Author login.
    pub author: String,
    /// Comma separated assignee logins.
    pub assignees: String,
    /// Number of comments.
    pub comments: usize,
    /// `+adds -dels`.
    pub lines: String,
}

/// Builds one row per item, in store order, flagging the row at `selection`.
///
/// `now` anchors the relative ages so the result depends only on the
/// arguments.
#[must_use]
pub fn build_rows(items: &[PullRequest], selection: usize, now: DateTime<Utc>) -> Vec<PrRow> {
    items
        .iter()
        .enumerate()
        .map(|(i, pr)| PrRow {
            number: pr.number,
            selected: i == selection,
            updated: format_age(pr.updated_at, now),
            state: RowState::of(pr),
            repo: pr.repository.clone(),
            title: format!("#{} {}", pr.number, pr.title),
            author: pr.author.clone(),
            assignees: pr
                .assignees
                .iter()
                .map(|a| a.login.as_str())
                .collect::<Vec<_>>()
                .join(","),
            comments: pr.comments.len(),
            lines: format!("+{} -{}", pr.additions, pr.deletions),
        })
        .collect()
}

/// Short relative age: `now`, `42m`, `5h`, `3d`, `2w`, `4mo`, `1y`.
#[must_use]
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(then);
    let minutes = age.num_minutes();
    if minutes < 1 {
        return "now".to_string();
    }
    let hours = age.num_hours();
    let days = age.num_days();
    if hours < 1 {
        format!("{minutes}m")
    } else if days < 1 {
        format!("{hours}h")
    } else if days < 14 {
        format!("{days}d")
    } else if days < 60 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
