//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    Open,
    ToggleExpand,
    Compose,
    NewConversation,
    RenameConversation,
    DeleteConversation,
    ExportConversation,
    Refresh,
    Cancel,
}

/// Map a key event in normal (navigation) mode. Compose and rename input
/// modes bypass this map and feed keys to their editors directly.
pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Enter => Some(Action::Open),
        KeyCode::Char('x') => Some(Action::ToggleExpand),
        KeyCode::Char('i') => Some(Action::Compose),
        KeyCode::Char('n') => Some(Action::NewConversation),
        KeyCode::Char('r') => Some(Action::RenameConversation),
        KeyCode::Char('d') => Some(Action::DeleteConversation),
        KeyCode::Char('e') => Some(Action::ExportConversation),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let index = match c {
                '1' => 0,
                '2' => 1,
                _ => return None,
            };
            Some(Action::SwitchView(index))
        }
        _ => None,
    }
}
