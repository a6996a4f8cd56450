use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::edit::{EditField, CELLS_PER_ITEM};
use crate::filter::{format_hours, item_hours_status};
use crate::model::work_item::WorkItem;
use crate::state::ViewState;
use crate::ui::theme::{flash_style, hours_status_color, palette, state_color, Palette};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let colors = palette(app.config.dark_mode);
    let visible = app.visible_items();

    let title = match app.view {
        ViewState::Loading => " Work Items (loading...) ".to_string(),
        ViewState::Saving => " Work Items (saving...) ".to_string(),
        _ => format!(" Work Items ({}) ", visible.len()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .title(title);

    if visible.is_empty() {
        let message = if app.view == ViewState::Loading {
            "Loading work items..."
        } else if app.filter.has_list_filters() {
            "No work items match the current filters (c to clear)"
        } else {
            "No open work items assigned to you"
        };
        let paragraph = Paragraph::new(Line::styled(message, Style::default().fg(colors.muted)))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let focused_row = app.focused_cell.map(|i| i / CELLS_PER_ITEM);
    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(row, item)| {
            let focused = focused_row == Some(row);
            ListItem::new(card(app, item, focused, area.width, &colors))
        })
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default().with_selected(focused_row);
    f.render_stateful_widget(list, area, &mut state);
}

/// Two-line card: identity and title, then state and effort cells.
fn card<'a>(
    app: &'a App,
    item: &'a WorkItem,
    focused: bool,
    width: u16,
    colors: &Palette,
) -> Vec<Line<'a>> {
    let max_title = width.saturating_sub(24) as usize;
    let title: String = item.title.chars().take(max_title).collect();
    let title_style = if focused {
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.text)
    };

    let mut header = vec![
        Span::styled(format!("#{} ", item.id), Style::default().fg(colors.accent)),
        Span::styled(
            format!("[{}] ", item.work_item_type),
            Style::default().fg(colors.muted),
        ),
        Span::styled(title, title_style),
    ];
    if app.filter.project.is_all() && app.config.projects.len() > 1 {
        header.push(Span::styled(
            format!("  {}", item.project_name),
            Style::default().fg(colors.muted),
        ));
    }

    let estimate_style = match item_hours_status(item) {
        Some(status) => Style::default().fg(hours_status_color(status)),
        None => Style::default().fg(colors.muted),
    };
    let mut details = vec![
        Span::raw("   "),
        Span::styled(item.state.clone(), Style::default().fg(state_color(&item.state))),
        Span::styled(
            format!(" | {} | {} | ", item.iteration_name(), item.priority_label()),
            Style::default().fg(colors.muted),
        ),
        Span::styled(
            format!("Est {}", format_hours(item.original_estimate)),
            estimate_style,
        ),
    ];
    for field in EditField::ALL {
        details.push(Span::styled(
            format!("  {} ", short_label(field)),
            Style::default().fg(colors.muted),
        ));
        details.push(cell_span(app, item, field, colors));
    }

    vec![Line::from(header), Line::from(details)]
}

fn short_label(field: EditField) -> &'static str {
    match field {
        EditField::RemainingWork => "Rem",
        EditField::CompletedWork => "Done",
    }
}

fn cell_span(app: &App, item: &WorkItem, field: EditField, colors: &Palette) -> Span<'static> {
    let text = app.cell_text(item, field);
    let is_focused = app.focused_cell_ref().is_some_and(|c| {
        c.project_id == item.project_id && c.item_id == item.id && c.field == field
    });

    if let Some(kind) = app.flash_for(item, field) {
        return Span::styled(format!(" {text} "), flash_style(kind));
    }
    if app.is_editing(item, field) {
        let selected = app.edit.as_ref().is_some_and(|s| s.is_selected());
        let style = if selected {
            Style::default().fg(colors.text).bg(colors.accent)
        } else {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::UNDERLINED)
        };
        return Span::styled(format!("[{text}_]"), style);
    }
    if is_focused {
        return Span::styled(
            format!("[{text}]"),
            Style::default()
                .fg(colors.accent)
                .bg(colors.focus_bg)
                .add_modifier(Modifier::BOLD),
        );
    }
    Span::styled(format!(" {text} "), Style::default().fg(colors.text))
}
