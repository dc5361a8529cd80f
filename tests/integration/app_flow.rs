//! End-to-end tests of the app driven by key presses against the in-memory
//! fixture backend.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use prdash::actions::{PrAction, PrActions};
use prdash::app::{App, Command};
use prdash::config::{SectionConfig, default_sections};
use prdash::dispatch;
use prdash::event::AppEvent;
use prdash::fetch::fixture::FixtureBackend;
use prdash_proto::pr::{PrState, PullRequest};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Dash {
    app: App,
    backend: Arc<FixtureBackend>,
    tx: mpsc::Sender<AppEvent>,
    rx: mpsc::Receiver<AppEvent>,
}

impl Dash {
    fn new(backend: FixtureBackend, sections: Vec<SectionConfig>, limit: usize) -> Self {
        let (tx, rx) = mpsc::channel(64);
        Self {
            app: App::new(sections, limit),
            backend: Arc::new(backend),
            tx,
            rx,
        }
    }

    /// Spawns `commands` and applies one event per command.
    async fn run(&mut self, commands: Vec<Command>) {
        let count = commands.len();
        dispatch::spawn_all(&self.backend, commands, &self.tx);
        for _ in 0..count {
            let event = self.rx.recv().await.expect("event");
            self.app.handle_event(event);
        }
    }

    async fn start(&mut self) {
        let commands = self.app.fetch_all_sections();
        self.run(commands).await;
    }

    async fn press(&mut self, code: KeyCode) {
        let commands = self
            .app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
        self.run(commands).await;
    }

    async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c)).await;
        }
    }
}

fn mixed_prs() -> Vec<PullRequest> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    (1..=10u64)
        .map(|n| {
            let author = if n % 2 == 0 { "me" } else { "dana" };
            let title = if n <= 3 { "Fix pagination" } else { "Add feature" };
            let mut pr = PullRequest::new(
                n,
                title,
                "acme/app",
                author,
                base - Duration::minutes(i64::try_from(n).unwrap()),
            );
            if n == 10 {
                pr.state = PrState::Closed;
            }
            pr
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn demo_sections_load_on_start() {
    let mut dash = Dash::new(FixtureBackend::demo("me", Utc::now()), default_sections(), 20);
    dash.start().await;

    let mine = &dash.app.sections[0];
    assert!(!mine.items().is_empty());
    assert!(mine.items().iter().all(|pr| pr.author == "me"));
    assert!(mine.items().iter().all(|pr| pr.state == PrState::Open));
    assert_eq!(mine.rows().len(), mine.items().len());
    assert!(mine.rows()[0].selected);

    let involved = &dash.app.sections[2];
    assert!(involved.items().iter().all(|pr| pr.author != "me"));
    assert_eq!(dash.app.tasks.in_progress(), 0);
}

#[tokio::test]
async fn scrolling_pages_in_everything_once() {
    let sections = vec![SectionConfig::new("All", "")];
    let mut dash = Dash::new(FixtureBackend::new("me", mixed_prs()), sections, 3);
    dash.start().await;
    assert_eq!(dash.app.sections[0].items().len(), 3);
    assert_eq!(dash.app.sections[0].total_count(), 10);

    for _ in 0..12 {
        dash.press(KeyCode::Char('j')).await;
    }

    let section = &dash.app.sections[0];
    let numbers: Vec<u64> = section.items().iter().map(|pr| pr.number).collect();
    assert_eq!(numbers, (1..=10).collect::<Vec<_>>());
    let distinct: HashSet<u64> = numbers.iter().copied().collect();
    assert_eq!(distinct.len(), numbers.len());
    assert!(!section.has_next_page());
    assert_eq!(section.selection(), 9);
    assert!(section.rows()[9].selected);
}

#[tokio::test]
async fn committed_search_replaces_results() {
    let sections = vec![SectionConfig::new("Open", "is:open")];
    let mut dash = Dash::new(FixtureBackend::new("me", mixed_prs()), sections, 20);
    dash.start().await;
    assert_eq!(dash.app.sections[0].items().len(), 9);

    dash.press(KeyCode::Char('/')).await;
    dash.type_text(" pagination").await;
    dash.press(KeyCode::Enter).await;

    let section = &dash.app.sections[0];
    assert_eq!(section.search_value(), "is:open pagination");
    let numbers: Vec<u64> = section.items().iter().map(|pr| pr.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(section.total_count(), 3);
    assert_eq!(section.config().filters, "is:open");
}

#[tokio::test]
async fn refresh_picks_up_remote_changes() {
    let sections = vec![SectionConfig::new("Mine", "is:open author:@me")];
    let mut dash = Dash::new(FixtureBackend::new("me", mixed_prs()), sections, 20);
    dash.start().await;
    assert_eq!(dash.app.sections[0].items().len(), 4);

    // close #2 remotely, outside the app
    dash.backend
        .perform("acme/app", 2, &PrAction::Close)
        .await
        .unwrap();
    assert_eq!(dash.app.sections[0].items().len(), 4);

    dash.press(KeyCode::Char('r')).await;
    let numbers: Vec<u64> = dash.app.sections[0]
        .items()
        .iter()
        .map(|pr| pr.number)
        .collect();
    assert_eq!(numbers, vec![4, 6, 8]);
}

#[tokio::test]
async fn bad_fixture_cursor_surfaces_as_failed_task() {
    let sections = vec![SectionConfig::new("All", "")];
    let mut dash = Dash::new(FixtureBackend::new("me", mixed_prs()), sections, 3);
    let fetch = dash.app.fetch_next_page(1).unwrap();
    let Command::Fetch(mut fetch) = fetch else {
        panic!("expected fetch");
    };
    fetch.request.cursor = Some("bogus".to_string());
    dash.run(vec![Command::Fetch(fetch)]).await;

    let latest = dash.app.tasks.latest().unwrap();
    assert_eq!(
        latest.status_text(),
        "Fetching PRs for \"All\" failed: invalid cursor: bogus"
    );
    assert!(dash.app.sections[0].items().is_empty());
    assert!(!dash.app.sections[0].is_loading());
}
