use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::model::project::ProjectScope;
use crate::ui::theme::palette;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let colors = palette(app.config.dark_mode);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .title(" Settings ");

    if app.config.projects.is_empty() {
        let lines = vec![
            Line::styled(
                "No Azure DevOps projects configured.",
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
            Line::raw("Add one from your shell, then start hours again:"),
            Line::raw(""),
            Line::styled(
                "  hours add https://dev.azure.com/<org>/<project> -t <token>",
                Style::default().fg(colors.text),
            ),
            Line::styled(
                "  hours add <org>/<project> -t <token> -n <name>",
                Style::default().fg(colors.text),
            ),
            Line::raw(""),
            Line::styled(
                "The token needs the Work Items (Read & Write) scope.",
                Style::default().fg(colors.muted),
            ),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
        return;
    }

    let mut rows = vec![row(
        "All projects".to_string(),
        String::new(),
        app.filter.project.is_all(),
    )];
    rows.extend(app.config.projects.iter().map(|p| {
        let active = app.filter.project == ProjectScope::Project(p.id.clone());
        let marker = if app.pending_delete.as_deref() == Some(p.id.as_str()) {
            "  delete? y/n".to_string()
        } else {
            format!(" ({}/{})", p.organization, p.project)
        };
        row(p.name.clone(), marker, active)
    }));

    let list = List::new(rows).block(block).highlight_style(
        Style::default()
            .fg(colors.accent)
            .bg(colors.focus_bg)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default().with_selected(Some(app.selected_project));
    f.render_stateful_widget(list, area, &mut state);
}

fn row(name: String, detail: String, active: bool) -> ListItem<'static> {
    let bullet = if active { "● " } else { "  " };
    let detail_style = if detail.contains("delete?") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    ListItem::new(Line::from(vec![
        Span::raw(bullet),
        Span::raw(name),
        Span::styled(detail, detail_style),
    ]))
}
