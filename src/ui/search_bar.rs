use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::theme::palette;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let colors = palette(app.config.dark_mode);
    let input = &app.filter.search;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .title(" Search by title or #id (enter keep, esc clear) ");

    let paragraph = Paragraph::new(Line::raw(input.as_str())).block(block);
    f.render_widget(paragraph, area);

    let x = area.x + 1 + input.chars().count() as u16;
    let y = area.y + 1;
    f.set_cursor_position((x.min(area.x + area.width.saturating_sub(2)), y));
}
