//! `prdash` — terminal dashboard of pull request sections.
//!
//! Each section is a saved search paged in from the backend. Configuration
//! via CLI flags, environment variables, or config file
//! (`~/.config/prdash/config.toml`).
//!
//! ```bash
//! # Built-in demo data
//! cargo run --bin prdash
//!
//! # Serve pull requests from a JSON file
//! cargo run --bin prdash -- --fixture prs.json
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use prdash::app::App;
use prdash::config::{CliArgs, DashConfig};
use prdash::dispatch;
use prdash::event::AppEvent;
use prdash::fetch::fixture::FixtureBackend;
use prdash::ui;

/// Login `@me` resolves to in the fixture backend.
const VIEWER: &str = "me";

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match DashConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            DashConfig::from_cli(&cli)
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(sections = config.sections.len(), "prdash starting");

    let backend = match &config.fixture {
        Some(path) => match FixtureBackend::from_json_file(VIEWER, path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error: failed to load fixture {}: {e}", path.display());
                return Err(io::Error::other(e));
            }
        },
        None => FixtureBackend::demo(VIEWER, Utc::now()),
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    // Run the app.
    let result = run_app(&mut terminal, Arc::new(backend), &config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("prdash exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("prdash.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    backend: Arc<FixtureBackend>,
    config: &DashConfig,
) -> io::Result<()> {
    let mut app = App::new(config.sections.clone(), config.prs_limit);
    let (tx, mut rx) = mpsc::channel(config.channel_capacity);

    dispatch::spawn_all(&backend, app.fetch_all_sections(), &tx);
    let mut last_refresh = Instant::now();

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all completed fetches and actions (non-blocking).
        drain_events(&mut app, &mut rx);

        // Step 3: Periodic full refresh.
        if let Some(interval) = config.refetch_interval
            && last_refresh.elapsed() >= interval
        {
            dispatch::spawn_all(&backend, app.refresh_all(), &tx);
            last_refresh = Instant::now();
        }

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            dispatch::spawn_all(&backend, app.handle_key_event(key), &tx);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Apply every pending event to the app, in arrival order.
fn drain_events(app: &mut App, rx: &mut mpsc::Receiver<AppEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.handle_event(event);
    }
}
