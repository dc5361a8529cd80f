//! Search bar and pull request table of the visible section.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::theme;
use crate::app::{App, InputMode};
use crate::section::{PrRow, RowState, Section};

const HEADER: [&str; 8] = ["", "Updated", "Repo", "Title", "Author", "Assignees", "", "Lines"];

const WIDTHS: [Constraint; 8] = [
    Constraint::Length(2),
    Constraint::Length(7),
    Constraint::Percentage(15),
    Constraint::Min(20),
    Constraint::Length(14),
    Constraint::Percentage(15),
    Constraint::Length(4),
    Constraint::Length(12),
];

/// Render the search bar, editable while in search mode.
pub fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.mode == InputMode::Search;
    let text = if editing {
        Line::from(vec![
            Span::styled(app.input.as_str(), theme::normal()),
            Span::styled("\u{2588}", theme::input_cursor()),
        ])
    } else {
        let value = app.current_section().map_or("", Section::search_value);
        Line::from(Span::styled(value, theme::dimmed()))
    };

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(if editing {
            theme::highlighted()
        } else {
            theme::normal()
        });
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Render the visible section's rows.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(section) = app.current_section() else {
        return;
    };

    let title = section.last_updated().map_or_else(
        || format!(" {} ", section.title()),
        |at| format!(" {} \u{00b7} updated {} ", section.title(), at.format("%H:%M:%S")),
    );
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TABLE_TITLE)))
        .borders(Borders::ALL);

    if section.rows().is_empty() {
        let message = if section.is_loading() {
            "Fetching pull requests\u{2026}"
        } else {
            "No pull requests were found that match the given filters"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, theme::dimmed())).block(block),
            area,
        );
        return;
    }

    let rows: Vec<Row> = section.rows().iter().map(table_row).collect();
    let header = Row::new(HEADER).style(theme::bold());
    let table = Table::new(rows, WIDTHS).header(header).block(block);
    frame.render_widget(table, area);
}

fn table_row(row: &PrRow) -> Row<'_> {
    let state = Cell::from(row.state.symbol()).style(theme::normal().fg(state_color(row.state)));
    let cells = vec![
        state,
        Cell::from(row.updated.as_str()).style(theme::timestamp()),
        Cell::from(row.repo.as_str()),
        Cell::from(row.title.as_str()),
        Cell::from(row.author.as_str()).style(theme::normal().fg(theme::author_color(&row.author))),
        Cell::from(row.assignees.as_str()),
        Cell::from(row.comments.to_string()),
        Cell::from(row.lines.as_str()),
    ];
    let style = if row.selected {
        theme::selected()
    } else {
        theme::normal()
    };
    Row::new(cells).style(style)
}

const fn state_color(state: RowState) -> ratatui::style::Color {
    match state {
        RowState::Open => theme::SUCCESS,
        RowState::Draft => theme::FG_SECONDARY,
        RowState::Closed => theme::ERROR,
        RowState::Merged => theme::MERGED,
    }
}
