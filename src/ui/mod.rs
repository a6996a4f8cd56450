pub mod detail_panel;
pub mod footer;
pub mod help;
pub mod item_list;
pub mod search_bar;
pub mod settings;
pub mod theme;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::state::ViewState;
use crate::ui::theme::palette;

pub fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    // Search box (3) while typing a query, else the one-line footer
    let bottom_height = if app.input_mode == InputMode::Search { 3 } else { 1 };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // filters and totals
            Constraint::Min(6),                // main content
            Constraint::Length(bottom_height), // footer or search bar
        ])
        .split(size);

    let header_area = vertical[0];
    let main_area = vertical[1];
    let bottom_area = vertical[2];

    render_header(f, header_area, app);

    match &app.view {
        ViewState::Init => {}
        ViewState::Settings => settings::render(f, main_area, app),
        ViewState::Error(message) => render_error(f, main_area, app, message),
        ViewState::Loading | ViewState::Loaded | ViewState::Saving => {
            if app.show_details {
                let horizontal = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(main_area);
                item_list::render(f, horizontal[0], app);
                detail_panel::render(f, horizontal[1], app);
            } else {
                item_list::render(f, main_area, app);
            }
        }
    }

    if app.input_mode == InputMode::Search {
        search_bar::render(f, bottom_area, app);
    } else {
        footer::render(f, bottom_area, app);
    }

    if app.show_help {
        help::render(f, size, app);
    }
}

/// Active scope and filters on the left, totals of the visible list after.
fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let colors = palette(app.config.dark_mode);
    let mut spans = vec![Span::styled(
        format!(" {} ", app.filter.project.label(&app.config.projects)),
        Style::default()
            .fg(Color::Black)
            .bg(colors.accent)
            .add_modifier(Modifier::BOLD),
    )];

    let filter = &app.filter;
    if let Some(t) = &filter.item_type {
        spans.push(Span::styled(format!("  type:{t}"), Style::default().fg(colors.accent)));
    }
    if let Some(it) = &filter.iteration {
        spans.push(Span::styled(
            format!("  iteration:{}", crate::model::work_item::last_segment(it)),
            Style::default().fg(colors.accent),
        ));
    }
    if !filter.search.is_empty() && app.input_mode == InputMode::Normal {
        spans.push(Span::styled(
            format!("  /{}", filter.search),
            Style::default().fg(colors.accent),
        ));
    }

    if app.view.shows_items() {
        spans.push(Span::styled(
            format!("  {}", app.summary().line()),
            Style::default().fg(colors.muted),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_error(f: &mut Frame, area: Rect, app: &App, message: &str) {
    let colors = palette(app.config.dark_mode);
    let lines = vec![
        Line::styled(
            "Could not load work items",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::styled(
            "Press r to retry or s to pick another project.",
            Style::default().fg(colors.muted),
        ),
    ];
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
