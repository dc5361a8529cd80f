//! Section tab strip.

use ratatui::{Frame, layout::Rect, text::Line, widgets::Tabs};

use super::theme;
use crate::app::App;

/// Render one tab per section, highlighting the visible one.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = app
        .sections
        .iter()
        .map(|section| {
            if section.is_loading() {
                Line::from(format!("{} \u{2026}", section.title()))
            } else {
                Line::from(format!("{} ({})", section.title(), section.total_count()))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current)
        .style(theme::dimmed())
        .highlight_style(theme::highlighted())
        .divider("|");
    frame.render_widget(tabs, area);
}
