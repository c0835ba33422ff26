//! View rendering dispatch.

pub mod chat;
pub mod conversations;
pub mod helpers;

use crate::nav::View;
use crate::state::{App, InputMode};
use crate::theme::notification_color;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Conversations => conversations::render(f, app, layout[1]),
        View::Chat => chat::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let mut spans = vec![Span::styled(
        " colloquy ",
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for view in View::all() {
        let style = if *view == app.active_view {
            Style::default()
                .fg(app.theme.border_focus)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        spans.push(Span::styled(format!(" {} ", view.title()), style));
    }
    if !app.chat_view.conversation_name.is_empty() {
        spans.push(Span::styled(
            format!("| {} ", app.chat_view.conversation_name),
            Style::default().fg(app.theme.text),
        ));
    }
    if app.sending {
        spans.push(Span::styled(
            "[sending...]",
            Style::default().fg(app.theme.warning),
        ));
    }
    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM).border_style(
            Style::default().fg(app.theme.border),
        ));
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let hints = match (app.active_view, app.input_mode) {
        (_, InputMode::Compose) => "Enter send | Alt+Enter newline | Esc cancel",
        (_, InputMode::Rename) => "Enter apply | Esc cancel",
        (View::Conversations, _) => {
            "j/k move | Enter open | n new | r rename | d delete | C-r refresh | q quit"
        }
        (View::Chat, _) => "j/k move | x expand | i compose | e export | Tab views | q quit",
    };
    let mut lines = vec![Line::from(Span::styled(
        hints,
        Style::default().fg(app.theme.text_dim),
    ))];
    if let Some(notification) = app.last_notification() {
        lines.push(Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(notification_color(notification.level, &app.theme)),
        )));
    }
    f.render_widget(Paragraph::new(lines), area);
}
