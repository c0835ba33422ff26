//! Core entity structures
//!
//! Wire casing is camelCase throughout: these shapes deserialize straight
//! from the orchestration service's GraphQL payloads.

use crate::{
    ActivityId, ActivityState, AgentId, ConversationId, MessageId, MessageRole, Timestamp,
};
use serde::{Deserialize, Serialize};

/// A single chat message.
///
/// Immutable once created except for `feedback_received`/`updated_at`.
/// Deletion is a whole-conversation operation owned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub parent_id: Option<MessageId>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub feedback_received: bool,
    /// Structured agent activities attached to this message. Empty for user
    /// messages and for conversations persisted in the legacy tag format.
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Message {
    /// Human-readable text of this message.
    ///
    /// Content may optimistically carry OpenAI-style JSON content parts
    /// (`[{"type":"text","text":...}, ...]`). Flattens the text parts when
    /// that parse succeeds, otherwise returns the raw content unchanged -
    /// a parse failure is never an error.
    pub fn display_text(&self) -> String {
        let trimmed = self.content.trim_start();
        if !trimmed.starts_with('[') {
            return self.content.clone();
        }
        match serde_json::from_str::<Vec<ContentPartProbe>>(trimmed) {
            Ok(parts) => {
                let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
                if texts.is_empty() {
                    self.content.clone()
                } else {
                    texts.join("\n")
                }
            }
            Err(_) => self.content.clone(),
        }
    }
}

/// Minimal shape probed for when message content looks like JSON parts.
#[derive(Debug, Deserialize)]
struct ContentPartProbe {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// One step of agent reasoning or tool execution surfaced to the user.
///
/// `parent_id`, when set, must reference another activity in the same
/// message's activity list - never an activity of a different message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: ActivityState,
    #[serde(default)]
    pub kind: Option<ActivityKind>,
    #[serde(default)]
    pub parent_id: Option<ActivityId>,
    pub message_id: MessageId,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Named activity category reported by the service (tool name and the like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityKind {
    pub name: String,
}

/// Conversation header fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    pub id: ConversationId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub agent_id: Option<AgentId>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub attachment_count: u32,
    #[serde(default)]
    pub has_notifications: bool,
}

/// A full conversation snapshot: header plus the flat message stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub metadata: ConversationMetadata,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Messages in canonical presentation order: `created_at` ascending,
    /// ties broken by `id` for determinism.
    pub fn sorted_messages(&self) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self.messages.iter().collect();
        messages.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        messages
    }

    /// Role of the newest message, if any.
    pub fn last_role(&self) -> Option<MessageRole> {
        self.sorted_messages().last().map(|m| m.role)
    }
}

/// List-view record for the conversation sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEdge {
    pub id: ConversationId,
    pub name: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub attachment_count: u32,
    #[serde(default)]
    pub has_notifications: bool,
    #[serde(default)]
    pub summary: Option<serde_json::Value>,
}
