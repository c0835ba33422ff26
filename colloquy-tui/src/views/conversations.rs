//! Conversation list view.

use crate::state::{App, InputMode};
use crate::views::helpers::truncate;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let chunks = if app.input_mode == InputMode::Rename {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0)])
            .split(area)
    };

    let items: Vec<ListItem> = app
        .conversations_view
        .edges
        .iter()
        .map(|edge| {
            let mut spans = vec![Span::styled(
                truncate(&edge.name, 48),
                Style::default().fg(app.theme.text),
            )];
            if edge.attachment_count > 0 {
                spans.push(Span::styled(
                    format!("  ({} files)", edge.attachment_count),
                    Style::default().fg(app.theme.text_dim),
                ));
            }
            if edge.has_notifications {
                spans.push(Span::styled(
                    "  \u{25cf}",
                    Style::default().fg(app.theme.accent),
                ));
            }
            spans.push(Span::styled(
                format!("  {}", edge.created_at.format("%Y-%m-%d %H:%M")),
                Style::default().fg(app.theme.text_dim),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default();
    state.select(app.conversations_view.selected_index());

    let list = List::new(items)
        .block(
            Block::default()
                .title("Conversations")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        )
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(list, chunks[0], &mut state);

    if app.input_mode == InputMode::Rename {
        let input = Paragraph::new(app.rename_input.as_str()).block(
            Block::default()
                .title("Rename conversation")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        );
        f.render_widget(input, chunks[1]);
    }
}
