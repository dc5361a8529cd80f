//! Status bar rendering.

use chrono::Local;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, InputMode};
use crate::tasks::TaskState;

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(prompt) = app.prompt_text() {
        let line = Line::from(vec![
            Span::styled(prompt, theme::bold().fg(theme::WARNING)),
            Span::raw(" "),
            Span::styled(app.input.as_str(), theme::normal()),
            Span::styled("\u{2588}", theme::input_cursor()),
        ]);
        frame.render_widget(Paragraph::new(line).style(theme::status_bar_bg()), area);
        return;
    }

    let help_text = match app.mode {
        InputMode::Normal => {
            "h/l: section | j/k: move | /: search | r/R: refresh | x/X: close/reopen | W: ready | m: merge | c: comment | a/A: assign | q: quit"
        }
        InputMode::Search => "Enter: apply search | Esc: cancel",
        InputMode::Comment => "Type a comment | Enter: post | Esc: cancel",
        InputMode::Assignees(_) => "Logins separated by spaces | Enter: apply | Esc: cancel",
        InputMode::Confirm(_) => "",
    };

    let mut spans = vec![Span::styled("prdash", theme::bold()), Span::raw(" | ")];
    if let Some(task) = app.tasks.latest() {
        let color = match task.state {
            TaskState::Started => theme::WARNING,
            TaskState::Finished => theme::SUCCESS,
            TaskState::Error(_) => theme::ERROR,
        };
        spans.push(Span::styled("\u{25cf}", theme::normal().fg(color)));
        spans.push(Span::raw(format!(" {}", task.status_text())));
        if !task.is_settled() {
            let secs = task.elapsed(Local::now()).num_seconds();
            spans.push(Span::styled(format!(" ({secs}s)"), theme::dimmed()));
        }
        spans.push(Span::raw(" | "));
    }
    if matches!(app.mode, InputMode::Comment | InputMode::Assignees(_)) {
        spans.push(Span::styled(app.input.as_str(), theme::normal()));
        spans.push(Span::styled("\u{2588}", theme::input_cursor()));
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(help_text, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
