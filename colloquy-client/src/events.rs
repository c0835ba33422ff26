//! Events emitted by the client toward the UI layer.

use colloquy_core::{Conversation, ConversationId};

#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Fresh conversation snapshot from a successful poll.
    Snapshot {
        conversation_id: ConversationId,
        conversation: Box<Conversation>,
    },
    /// A poll fetch failed; the manager keeps polling.
    PollFailed {
        conversation_id: ConversationId,
        error: String,
    },
}
