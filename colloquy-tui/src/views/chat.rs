//! Chat log view: messages with collapsible activity forests.

use crate::state::{App, ChatRow, InputMode};
use crate::theme::{activity_state_color, role_color};
use crate::views::helpers::format_elapsed;
use chrono::Utc;
use colloquy_core::ActivityState;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    render_log(f, app, chunks[0]);
    render_input(f, app, chunks[1]);
}

fn render_log(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let items: Vec<ListItem> = app
        .chat_view
        .rows
        .iter()
        .map(|row| render_row(app, row))
        .collect();

    let mut state = ListState::default();
    if !app.chat_view.rows.is_empty() {
        state.select(Some(app.chat_view.selected));
    }

    let title = if app.chat_view.conversation_name.is_empty() {
        "Chat".to_string()
    } else {
        app.chat_view.conversation_name.clone()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_row<'a>(app: &'a App, row: &'a ChatRow) -> ListItem<'a> {
    match row {
        ChatRow::Message { item_index } => {
            let item = &app.chat_view.projection.items[*item_index];
            let message = &item.message;
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    format!("{} ", message.role),
                    Style::default()
                        .fg(role_color(message.role, &app.theme))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    message.created_at.format("%H:%M:%S").to_string(),
                    Style::default().fg(app.theme.text_dim),
                ),
            ])];
            for text_line in message.display_text().lines() {
                lines.push(Line::from(Span::styled(
                    text_line.to_string(),
                    Style::default().fg(app.theme.text),
                )));
            }
            ListItem::new(Text::from(lines))
        }
        ChatRow::Activity {
            depth,
            has_children,
            expanded,
            title,
            body,
            state,
            started_at,
            next_at,
            ..
        } => {
            let indent = "  ".repeat(depth + 1);
            let marker = if *has_children {
                if *expanded {
                    "\u{25be} "
                } else {
                    "\u{25b8} "
                }
            } else {
                "\u{00b7} "
            };
            let running = next_at.is_none() && *state != ActivityState::Info;
            let elapsed = format_elapsed(*started_at, next_at.unwrap_or_else(Utc::now));
            let mut spans = vec![
                Span::raw(indent.clone()),
                Span::styled(marker, Style::default().fg(app.theme.text_dim)),
                Span::styled(
                    format!("[{elapsed}] "),
                    Style::default().fg(app.theme.text_dim),
                ),
                Span::styled(
                    title.clone(),
                    Style::default().fg(activity_state_color(*state, &app.theme)),
                ),
            ];
            if running {
                spans.push(Span::styled(
                    " \u{2026}",
                    Style::default().fg(app.theme.warning),
                ));
            }
            let mut lines = vec![Line::from(spans)];
            if *expanded {
                if let Some(body) = body {
                    for body_line in body.lines() {
                        lines.push(Line::from(Span::styled(
                            format!("{indent}    {body_line}"),
                            Style::default().fg(app.theme.text_dim),
                        )));
                    }
                }
            }
            ListItem::new(Text::from(lines))
        }
    }
}

fn render_input(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    if app.input_mode == InputMode::Compose {
        f.render_widget(app.compose.widget(), area);
    } else {
        let hint = if app.sending {
            "sending\u{2026}"
        } else if app.chat_view.conversation_id.is_some() {
            "press i to compose"
        } else {
            "open a conversation to chat"
        };
        let paragraph = Paragraph::new(Span::styled(
            hint,
            Style::default().fg(app.theme.text_dim),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(paragraph, area);
    }
}
