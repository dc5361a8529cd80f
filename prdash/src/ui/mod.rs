//! Terminal UI rendering.

pub mod section_table;
pub mod status_bar;
pub mod tabs;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Tabs, search bar, table, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    tabs::render(frame, chunks[0], app);
    section_table::render_search(frame, chunks[1], app);
    section_table::render(frame, chunks[2], app);
    status_bar::render(frame, chunks[3], app);
}
