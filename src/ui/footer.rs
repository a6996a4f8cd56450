use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::state::ViewState;
use crate::ui::theme::{palette, status_color};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let colors = palette(app.config.dark_mode);
    let mut spans = Vec::new();

    let editing = app.edit.as_ref().is_some_and(|s| !s.is_handled());
    if editing {
        spans.push(hint("enter/tab", "save"));
        spans.push(hint("↑↓", "save & move"));
        spans.push(hint("esc", "cancel"));
    } else {
        match &app.view {
            ViewState::Settings => {
                spans.push(hint("↑↓", "navigate"));
                spans.push(hint("enter", "select"));
                spans.push(hint("x", "delete"));
                spans.push(hint("esc", "back"));
                spans.push(hint("q", "quit"));
            }
            ViewState::Error(_) => {
                spans.push(hint("r", "retry"));
                spans.push(hint("s", "settings"));
                spans.push(hint("q", "quit"));
            }
            _ => {
                spans.push(hint("←→↑↓", "move"));
                spans.push(hint("enter", "edit"));
                spans.push(hint("/", "search"));
                spans.push(hint("t/i/p", "filter"));
                spans.push(hint("e", "details"));
                spans.push(hint("r", "refresh"));
                spans.push(hint("?", "help"));
                spans.push(hint("q", "quit"));
            }
        }
    }

    if let Some(status) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            status.text.clone(),
            Style::default().fg(status_color(status.kind)),
        ));
    }

    let line = Line::from(spans).style(Style::default().fg(colors.muted));
    f.render_widget(Paragraph::new(line), area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(
        format!(" {key}:{desc} "),
        Style::default().fg(ratatui::style::Color::DarkGray),
    )
}
