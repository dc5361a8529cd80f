//! Runs the [`Command`]s the app emits against a backend.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actions::{PrActions, spawn_action};
use crate::app::Command;
use crate::event::AppEvent;
use crate::fetch::{PrFetcher, spawn_fetch};

/// Spawns `command` on a background task. Its result arrives on `tx`.
pub fn spawn_command<B>(
    backend: &Arc<B>,
    command: Command,
    tx: &mpsc::Sender<AppEvent>,
) -> JoinHandle<()>
where
    B: PrFetcher + PrActions + 'static,
{
    match command {
        Command::Fetch(fetch) => spawn_fetch(Arc::clone(backend), fetch, tx.clone()),
        Command::Action(action) => spawn_action(Arc::clone(backend), action, tx.clone()),
    }
}

/// Spawns every command in order.
pub fn spawn_all<B>(
    backend: &Arc<B>,
    commands: impl IntoIterator<Item = Command>,
    tx: &mpsc::Sender<AppEvent>,
) -> Vec<JoinHandle<()>>
where
    B: PrFetcher + PrActions + 'static,
{
    commands
        .into_iter()
        .map(|command| spawn_command(backend, command, tx))
        .collect()
}
