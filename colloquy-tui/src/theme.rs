//! Slate theme and color utilities.
//!
//! Activity states map to colors through a lookup, never through widget
//! subclassing: one enum in, one color out.

use crate::notifications::NotificationLevel;
use colloquy_core::{ActivityState, MessageRole};
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct SlateTheme {
    pub bg: Color,
    pub surface: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub accent: Color,
    pub accent_dim: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl SlateTheme {
    pub fn slate() -> Self {
        Self {
            bg: Color::Rgb(15, 17, 21),
            surface: Color::Rgb(24, 27, 33),
            primary: Color::Rgb(122, 162, 247),
            primary_dim: Color::Rgb(61, 89, 161),
            accent: Color::Rgb(187, 154, 247),
            accent_dim: Color::Rgb(105, 82, 148),
            success: Color::Rgb(158, 206, 106),
            warning: Color::Rgb(224, 175, 104),
            error: Color::Rgb(247, 118, 142),
            info: Color::Rgb(125, 207, 255),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(115, 122, 140),
            border: Color::Rgb(52, 59, 72),
            border_focus: Color::Rgb(122, 162, 247),
        }
    }
}

/// Rendering hint for an activity state.
pub fn activity_state_color(state: ActivityState, theme: &SlateTheme) -> Color {
    match state {
        ActivityState::Error => theme.error,
        ActivityState::Warn => theme.warning,
        ActivityState::Info => theme.info,
        ActivityState::Success => theme.success,
        ActivityState::Thought => theme.accent,
        ActivityState::Reflection => theme.accent_dim,
        ActivityState::Execution => theme.primary,
        ActivityState::Diagram => theme.text_dim,
    }
}

pub fn role_color(role: MessageRole, theme: &SlateTheme) -> Color {
    match role {
        MessageRole::User => theme.primary,
        MessageRole::Agent => theme.text,
        MessageRole::System => theme.text_dim,
    }
}

pub fn notification_color(level: NotificationLevel, theme: &SlateTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}
