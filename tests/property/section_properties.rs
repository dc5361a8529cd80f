//! Property-based tests of section synchronization.
//!
//! Uses proptest to verify:
//! 1. Whatever order completions arrive in, only the latest issued fetch
//!    lands in the section, with or without a reset between issues.
//! 2. Following pages appends them in order without losing or repeating
//!    items.
//! 3. Adding assignees is idempotent and never duplicates a login.
//! 4. Removing assignees leaves none of the removed logins.
//! 5. There is one row per held item and exactly one selected row.
//! 6. Reset leaves a section indistinguishable from a new one.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, TimeZone, Utc};
use prdash::config::SectionConfig;
use prdash::fetch::FetchCommand;
use prdash::section::Section;
use prdash::section::patch::{add_assignees, remove_assignees};
use prdash_proto::page::{PageInfo, PrPage};
use prdash_proto::pr::{Assignee, PullRequest};
use proptest::prelude::*;

// --- Helpers ---

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
}

fn section() -> Section {
    Section::new(1, SectionConfig::new("Mine", "is:open"))
}

fn pr(number: u64) -> PullRequest {
    PullRequest::new(number, format!("PR {number}"), "acme/app", "me", now())
}

fn page(numbers: impl IntoIterator<Item = u64>, cursor: String, more: bool) -> PrPage {
    let prs: Vec<PullRequest> = numbers.into_iter().map(pr).collect();
    PrPage {
        total_count: prs.len(),
        prs,
        page_info: PageInfo::new(cursor, more),
    }
}

fn numbers(section: &Section) -> Vec<u64> {
    section.items().iter().map(|pr| pr.number).collect()
}

// --- Strategies ---

/// Logins drawn from a small alphabet so that overlaps are common.
fn arb_assignees() -> impl Strategy<Value = Vec<Assignee>> {
    prop::collection::vec("[a-e]{1,2}".prop_map(Assignee::new), 0..8)
}

/// Assignee lists without repeated logins.
fn arb_distinct_assignees() -> impl Strategy<Value = Vec<Assignee>> {
    arb_assignees().prop_map(|list| add_assignees(&[], &list))
}

/// Issue count plus a permutation of the completion order.
fn arb_issue_order() -> impl Strategy<Value = Vec<usize>> {
    (1usize..6).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    /// Overlapping fetches of the same page: whatever order they complete
    /// in, only the one issued last is merged.
    #[test]
    fn only_latest_overlapping_fetch_lands(order in arb_issue_order()) {
        let mut section = section();
        let issued: Vec<FetchCommand> = (0..order.len())
            .map(|_| section.fetch_next_page(10).expect("first page is always fetchable"))
            .collect();
        let latest = issued.len() - 1;
        prop_assert_eq!(section.last_task_id(), Some(&issued[latest].task.id));

        for &i in &order {
            let number = u64::try_from(i).unwrap() + 100;
            let admitted = section.apply_fetched(
                &issued[i].task.id,
                page([number], format!("c{i}"), true),
                now(),
            );
            prop_assert_eq!(admitted, i == latest);
        }
        prop_assert_eq!(numbers(&section), vec![u64::try_from(latest).unwrap() + 100]);
        let cursor = section.page_info().map(|p| p.start_cursor.clone());
        prop_assert_eq!(cursor, Some(format!("c{latest}")));
        prop_assert!(!section.is_loading());
    }

    /// Fetches separated by resets: only the one issued after the last
    /// reset is merged.
    #[test]
    fn only_latest_fetch_lands(order in arb_issue_order()) {
        let mut section = section();
        let issued: Vec<FetchCommand> = (0..order.len())
            .map(|_| {
                section.reset();
                section.fetch_next_page(10).expect("first page is always fetchable")
            })
            .collect();
        let latest = issued.len() - 1;

        for &i in &order {
            let number = u64::try_from(i).unwrap() + 100;
            let admitted = section.apply_fetched(
                &issued[i].task.id,
                page([number], format!("c{i}"), false),
                now(),
            );
            prop_assert_eq!(admitted, i == latest);
        }
        prop_assert_eq!(numbers(&section), vec![u64::try_from(latest).unwrap() + 100]);
    }

    /// Disjoint pages are appended in arrival order.
    #[test]
    fn pages_append_in_order(sizes in prop::collection::vec(0usize..5, 1..6)) {
        let mut section = section();
        let mut expected: Vec<u64> = Vec::new();
        let mut next = 1u64;

        for (i, &size) in sizes.iter().enumerate() {
            let cmd = section.fetch_next_page(size.max(1)).unwrap();
            let batch: Vec<u64> = (next..next + size as u64).collect();
            next += size as u64;
            expected.extend(&batch);
            let more = i + 1 < sizes.len();
            let admitted = section.apply_fetched(&cmd.task.id, page(batch, format!("c{i}"), more), now());
            prop_assert!(admitted);
        }

        prop_assert_eq!(numbers(&section), expected);
        prop_assert!(!section.has_next_page());
        prop_assert!(section.fetch_next_page(10).is_none());
    }

    /// Adding the same assignees twice changes nothing the second time.
    #[test]
    fn add_assignees_idempotent(current in arb_distinct_assignees(), added in arb_assignees()) {
        let once = add_assignees(&current, &added);
        let twice = add_assignees(&once, &added);
        prop_assert_eq!(&once, &twice);

        let logins: std::collections::HashSet<&str> = once.iter().map(|a| a.login.as_str()).collect();
        prop_assert_eq!(logins.len(), once.len());
        prop_assert!(added.iter().all(|a| once.contains(a)));
        prop_assert_eq!(&once[..current.len()], &current[..]);
    }

    /// Removed assignees are gone and everyone else keeps their order.
    #[test]
    fn remove_assignees_complete(current in arb_assignees(), removed in arb_assignees()) {
        let out = remove_assignees(&current, &removed);
        prop_assert!(out.iter().all(|a| !removed.contains(a)));
        let kept: Vec<Assignee> = current.iter().filter(|a| !removed.contains(a)).cloned().collect();
        prop_assert_eq!(out, kept);
    }

    /// Rows mirror items one to one with a single selected row.
    #[test]
    fn rows_match_items(count in 0u64..20, moves in prop::collection::vec(any::<bool>(), 0..30)) {
        let mut section = section();
        let cmd = section.fetch_next_page(20).unwrap();
        section.apply_fetched(&cmd.task.id, page(1..=count, "c".to_string(), false), now());

        for down in moves {
            if down {
                section.select_next(now());
            } else {
                section.select_prev(now());
            }
        }

        let rows = section.rows();
        prop_assert_eq!(rows.len(), section.items().len());
        for (row, item) in rows.iter().zip(section.items()) {
            prop_assert_eq!(row.number, item.number);
        }
        let selected = rows.iter().filter(|r| r.selected).count();
        prop_assert_eq!(selected, usize::from(count > 0));
        if count > 0 {
            prop_assert!(rows[section.selection()].selected);
        }
    }

    /// After reset nothing of the old state survives.
    #[test]
    fn reset_is_complete(pages in 1usize..4, moves in 0usize..5) {
        let mut section = section();
        let mut last = None;
        for i in 0..pages {
            let cmd = section.fetch_next_page(3).unwrap();
            let start = (i * 3) as u64 + 1;
            section.apply_fetched(&cmd.task.id, page(start..start + 3, format!("c{i}"), true), now());
            last = Some(cmd);
        }
        for _ in 0..moves {
            section.select_next(now());
        }
        let in_flight = section.fetch_next_page(3).unwrap();

        section.reset();

        prop_assert!(section.items().is_empty());
        prop_assert!(section.rows().is_empty());
        prop_assert_eq!(section.total_count(), 0);
        prop_assert!(section.page_info().is_none());
        prop_assert!(section.last_task_id().is_none());
        prop_assert_eq!(section.selection(), 0);
        prop_assert!(section.has_next_page());
        prop_assert!(!section.is_loading());
        prop_assert_eq!(section.search_value(), "is:open");

        let stale = page([99], "x".to_string(), false);
        let admitted_in_flight = section.apply_fetched(&in_flight.task.id, stale, now());
        prop_assert!(!admitted_in_flight);
        let older = page([98], "y".to_string(), false);
        let admitted_older = section.apply_fetched(&last.unwrap().task.id, older, now());
        prop_assert!(!admitted_older);
        prop_assert!(section.items().is_empty());

        let fresh = section.fetch_next_page(3).unwrap();
        prop_assert_eq!(fresh.request.cursor, None);
    }
}
