//! Integration tests for pull request actions.
//!
//! Actions run through `spawn_action` and come back as events carrying the
//! patch that mirrors them locally; pushed updates go through the same
//! patch path without a fetch.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use prdash::actions::{ActionCommand, ActionError, PrAction, spawn_action};
use prdash::app::{App, Command};
use prdash::config::SectionConfig;
use prdash::dispatch;
use prdash::event::AppEvent;
use prdash::fetch::fixture::FixtureBackend;
use prdash::tasks::TaskState;
use prdash_proto::pr::{Assignee, PrState, PullRequest};
use prdash_proto::update::{PrChange, UpdatePr};
use tokio::sync::mpsc;

#[path = "../support/scripted.rs"]
mod scripted;

use scripted::ScriptedBackend;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn prs() -> Vec<PullRequest> {
    let at = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let mut draft = PullRequest::new(1, "Draft work", "acme/app", "me", at);
    draft.is_draft = true;
    draft.assignees.push(Assignee::new("me"));
    let open = PullRequest::new(2, "Ready work", "acme/app", "bob", at);
    vec![draft, open]
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// App with one loaded section served by `backend`.
async fn loaded(
    backend: &Arc<FixtureBackend>,
) -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
    let (tx, mut rx) = mpsc::channel(16);
    let mut app = App::new(vec![SectionConfig::new("All", "")], 10);
    dispatch::spawn_all(backend, app.fetch_all_sections(), &tx);
    app.handle_event(rx.recv().await.unwrap());
    (app, tx, rx)
}

/// Presses `action_key`, confirms with `y` and applies the outcome.
async fn confirm(
    app: &mut App,
    backend: &Arc<FixtureBackend>,
    tx: &mpsc::Sender<AppEvent>,
    rx: &mut mpsc::Receiver<AppEvent>,
    action_key: char,
) -> ActionCommand {
    app.handle_key_event(key(KeyCode::Char(action_key)));
    app.handle_key_event(key(KeyCode::Char('y')));
    let commands = app.handle_key_event(key(KeyCode::Enter));
    let Some(Command::Action(command)) = commands.first().cloned() else {
        panic!("expected action");
    };
    dispatch::spawn_all(backend, commands, tx);
    app.handle_event(rx.recv().await.unwrap());
    command
}

// ---------------------------------------------------------------------------
// Through the app
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ready_marks_draft_locally_and_remotely() {
    let backend = Arc::new(FixtureBackend::new("me", prs()));
    let (mut app, tx, mut rx) = loaded(&backend).await;
    assert!(app.sections[0].items()[0].is_draft);

    let command = confirm(&mut app, &backend, &tx, &mut rx, 'W').await;

    assert!(!app.sections[0].items()[0].is_draft);
    assert!(!backend.snapshot()[0].is_draft);
    let task = app.tasks.get(&command.task.id).unwrap();
    assert_eq!(task.status_text(), "PR #1 has been marked as ready for review");
}

#[tokio::test]
async fn merge_then_rejected_reopen() {
    let backend = Arc::new(FixtureBackend::new("me", prs()));
    let (mut app, tx, mut rx) = loaded(&backend).await;

    confirm(&mut app, &backend, &tx, &mut rx, 'm').await;
    assert_eq!(app.sections[0].items()[0].state, PrState::Merged);

    let reopen = confirm(&mut app, &backend, &tx, &mut rx, 'X').await;
    assert_eq!(app.sections[0].items()[0].state, PrState::Merged);
    let task = app.tasks.get(&reopen.task.id).unwrap();
    assert_eq!(
        task.state,
        TaskState::Error("action rejected: cannot reopen a merged pull request".to_string())
    );
}

#[tokio::test]
async fn comment_and_assign_from_text_input() {
    let backend = Arc::new(FixtureBackend::new("me", prs()));
    let (mut app, tx, mut rx) = loaded(&backend).await;
    app.handle_key_event(key(KeyCode::Char('j')));

    app.handle_key_event(key(KeyCode::Char('c')));
    for c in "lgtm".chars() {
        app.handle_key_event(key(KeyCode::Char(c)));
    }
    let commands = app.handle_key_event(key(KeyCode::Enter));
    dispatch::spawn_all(&backend, commands, &tx);
    app.handle_event(rx.recv().await.unwrap());

    app.handle_key_event(key(KeyCode::Char('a')));
    for c in "me carol me".chars() {
        app.handle_key_event(key(KeyCode::Char(c)));
    }
    let commands = app.handle_key_event(key(KeyCode::Enter));
    dispatch::spawn_all(&backend, commands, &tx);
    app.handle_event(rx.recv().await.unwrap());

    let pr = &app.sections[0].items()[1];
    assert_eq!(pr.number, 2);
    assert_eq!(pr.comments.len(), 1);
    assert_eq!(pr.comments[0].author, "me");
    assert_eq!(pr.comments[0].body, "lgtm");
    assert_eq!(pr.assignees, vec![Assignee::new("me"), Assignee::new("carol")]);
    assert_eq!(app.sections[0].rows()[1].assignees, "me,carol");
    assert_eq!(backend.snapshot()[1].assignees, pr.assignees);
}

// ---------------------------------------------------------------------------
// spawn_action directly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scripted_failure_is_reported() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.script_action(Err(ActionError::Remote("502".to_string())));
    let (tx, mut rx) = mpsc::channel(4);

    let command = ActionCommand::new(3, 9, "acme/app", PrAction::Close);
    spawn_action(Arc::clone(&backend), command.clone(), tx)
        .await
        .unwrap();

    let Some(AppEvent::ActionCompleted {
        section_id,
        task_id,
        outcome,
    }) = rx.recv().await
    else {
        panic!("expected action completion");
    };
    assert_eq!(section_id, 3);
    assert_eq!(task_id, command.task.id);
    assert_eq!(outcome, Err(ActionError::Remote("502".to_string())));
    assert_eq!(
        backend.performed(),
        vec![("acme/app".to_string(), 9, PrAction::Close)]
    );
}

#[tokio::test]
async fn comment_patch_uses_backend_viewer() {
    let backend = Arc::new(ScriptedBackend::new());
    let (tx, mut rx) = mpsc::channel(4);

    let command = ActionCommand::new(1, 5, "acme/app", PrAction::Comment("hi".to_string()));
    spawn_action(Arc::clone(&backend), command, tx)
        .await
        .unwrap();

    let Some(AppEvent::ActionCompleted { outcome, .. }) = rx.recv().await else {
        panic!("expected action completion");
    };
    let update = outcome.unwrap();
    assert_eq!(update.number, 5);
    assert_eq!(update.new_comment.unwrap().author, "tester");
}

#[tokio::test]
async fn unknown_pull_request_is_not_found() {
    let backend = Arc::new(FixtureBackend::new("me", prs()));
    let (tx, mut rx) = mpsc::channel(4);

    let command = ActionCommand::new(1, 77, "acme/app", PrAction::Merge);
    spawn_action(backend, command, tx).await.unwrap();

    let Some(AppEvent::ActionCompleted { outcome, .. }) = rx.recv().await else {
        panic!("expected action completion");
    };
    assert_eq!(outcome, Err(ActionError::NotFound(77)));
}

// ---------------------------------------------------------------------------
// Pushed updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pushed_update_patches_without_fetch() {
    let backend = Arc::new(FixtureBackend::new("me", prs()));
    let (mut app, _tx, _rx) = loaded(&backend).await;

    let update = UpdatePr::new(1)
        .with(PrChange::AssigneesRemoved(vec![Assignee::new("me")]))
        .with(PrChange::ClosedStateChanged(true));
    app.handle_event(AppEvent::EntityPatched {
        section_id: 1,
        update,
    });

    let pr = &app.sections[0].items()[0];
    assert!(pr.assignees.is_empty());
    assert_eq!(pr.state, PrState::Closed);
    assert_eq!(app.sections[0].rows()[0].state, prdash::section::RowState::Closed);
    // remote list untouched
    assert_eq!(backend.snapshot()[0].state, PrState::Open);
}
