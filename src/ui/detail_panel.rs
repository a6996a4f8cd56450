use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::azure::urls::work_item_url;
use crate::filter::{format_hours, item_hours_status};
use crate::ui::theme::{hours_status_color, palette, state_color};
use crate::util::html::html_to_text;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let colors = palette(app.config.dark_mode);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .title(" Details ");

    let Some(item) = app.focused_item() else {
        f.render_widget(block, area);
        return;
    };

    let label = |text: &'static str| Span::styled(text, Style::default().fg(colors.muted));
    let mut lines: Vec<Line> = vec![
        Line::styled(
            format!("#{} {}", item.id, item.title),
            Style::default().fg(colors.accent),
        ),
        Line::raw(""),
        Line::from(vec![label("Type: "), Span::raw(item.work_item_type.clone())]),
        Line::from(vec![
            label("State: "),
            Span::styled(item.state.clone(), Style::default().fg(state_color(&item.state))),
        ]),
        Line::from(vec![label("Priority: "), Span::raw(item.priority_label())]),
        Line::from(vec![label("Project: "), Span::raw(item.project_name.clone())]),
        Line::from(vec![label("Area: "), Span::raw(item.area_name().to_string())]),
        Line::from(vec![label("Iteration: "), Span::raw(item.iteration_name().to_string())]),
    ];
    if !item.assigned_to.is_empty() {
        lines.push(Line::from(vec![
            label("Assigned: "),
            Span::raw(item.assigned_to.clone()),
        ]));
    }

    let mut hours = vec![
        label("Hours: "),
        Span::raw(format!(
            "Est {} / Rem {} / Done {}",
            format_hours(item.original_estimate),
            format_hours(item.remaining_work),
            format_hours(item.completed_work),
        )),
    ];
    if let Some(status) = item_hours_status(item) {
        hours.push(Span::styled(
            format!("  {}", status.as_str()),
            Style::default().fg(hours_status_color(status)),
        ));
    }
    lines.push(Line::from(hours));

    lines.push(Line::from(vec![
        label("URL: "),
        Span::styled(
            work_item_url(&item.organization, &item.project, item.id),
            Style::default().fg(colors.accent),
        ),
    ]));

    let description = html_to_text(&item.description);
    if !description.is_empty() {
        lines.push(Line::raw(""));
        lines.extend(description.lines().map(|l| Line::raw(l.to_string())));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
