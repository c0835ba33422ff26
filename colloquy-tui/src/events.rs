//! Event types for the TUI event loop.

use colloquy_core::{ConversationEdge, ConversationId};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Resize { width: u16, height: u16 },
    SendFinished {
        conversation_id: ConversationId,
        result: Result<(), String>,
    },
    ConversationCreated { conversation_id: ConversationId },
    ConversationsRefreshed { edges: Vec<ConversationEdge> },
    ApiError(String),
}
