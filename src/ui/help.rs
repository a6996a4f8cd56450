use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::theme::palette;

const KEYS: &[(&str, &str)] = &[
    ("←→ tab", "move between Remaining and Completed"),
    ("↑↓", "move between items"),
    ("enter", "edit the focused hours, enter again to save"),
    ("esc", "cancel an edit"),
    ("/", "search titles and ids"),
    ("t / i", "cycle type / iteration filter"),
    ("p", "cycle project"),
    ("c", "clear filters"),
    ("e", "toggle details"),
    ("r", "refresh"),
    ("s", "settings"),
    ("m", "toggle dark mode"),
    ("q", "quit"),
];

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let colors = palette(app.config.dark_mode);
    let popup = centered(area, 64, KEYS.len() as u16 + 6);

    let mut lines = vec![
        Line::styled(
            "Your open work items, with hours you can edit in place.",
            Style::default().fg(colors.text),
        ),
        Line::raw(""),
    ];
    lines.extend(KEYS.iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(
                format!("{key:>8}  "),
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(*desc),
        ])
    }));
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Press ? or esc to close",
        Style::default().fg(colors.muted),
    ));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.accent))
            .title(" Help "),
    );
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    rect
}
