//! Wire request and response types for the orchestration service.

use crate::ClientError;
use colloquy_core::{Conversation, ConversationEdge, ConversationId};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// GRAPHQL ENVELOPE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GqlRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GqlEnvelope<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GqlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GqlError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationData {
    pub conversation: Conversation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationsData {
    pub conversations: ConversationConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConnection {
    pub edges: Vec<ConversationEdge>,
}

// ============================================================================
// CHAT COMPLETIONS
// ============================================================================

/// OpenAI-style completion request. `user` carries the conversation id so
/// the service can append to the right thread.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub user: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// One part of a message body: plain text, or an attachment expressed as a
/// data URL. File parts serialize with a mime-derived key, e.g.
/// `{"type":"image_url","file_name":...,"image_url":{"url":...}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text {
        text: String,
    },
    FileUrl {
        kind: String,
        file_name: String,
        url: String,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Build a file part from a data URL. The part kind comes from the URL's
    /// mime type: `data:image/png;base64,...` becomes an `image_url` part.
    pub fn from_data_url(file_name: &str, data_url: &str) -> Result<Self, ClientError> {
        let mime = data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split(|c| c == ';' || c == ',').next())
            .filter(|mime| !mime.is_empty())
            .ok_or_else(|| ClientError::Attachment {
                file_name: file_name.to_string(),
                reason: "not a data URL".to_string(),
            })?;
        let family = mime.split('/').next().unwrap_or_default();
        if family.is_empty() {
            return Err(ClientError::Attachment {
                file_name: file_name.to_string(),
                reason: format!("unusable mime type {mime:?}"),
            });
        }
        Ok(ContentPart::FileUrl {
            kind: format!("{family}_url"),
            file_name: file_name.to_string(),
            url: data_url.to_string(),
        })
    }
}

impl Serialize for ContentPart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentPart::Text { text } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "text")?;
                map.serialize_entry("text", text)?;
                map.end()
            }
            ContentPart::FileUrl {
                kind,
                file_name,
                url,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", kind)?;
                map.serialize_entry("file_name", file_name)?;
                map.serialize_entry(kind, &serde_json::json!({ "url": url }))?;
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Conversation id the completion was appended to. The service returns
    /// it so a send against a fresh conversation can adopt the real id.
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: CompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    pub content: String,
}

// ============================================================================
// CONVERSATION LIFECYCLE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CreateConversationRequest {
    pub conversation: NewConversation,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewConversation {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConversationResponse {
    pub conversation: CreatedConversation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedConversation {
    pub id: ConversationId,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameConversationRequest {
    pub name: String,
}

/// Error body the service returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(alias = "detail", alias = "error")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_part_serializes_with_type_tag() {
        let part = ContentPart::text("hello");
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value, serde_json::json!({"type": "text", "text": "hello"}));
    }

    #[test]
    fn image_data_url_becomes_image_url_part() {
        let part = ContentPart::from_data_url("cat.png", "data:image/png;base64,AAAA").unwrap();
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "image_url",
                "file_name": "cat.png",
                "image_url": {"url": "data:image/png;base64,AAAA"},
            })
        );
    }

    #[test]
    fn audio_data_url_becomes_audio_url_part() {
        let part = ContentPart::from_data_url("memo.wav", "data:audio/wav;base64,AAAA").unwrap();
        match part {
            ContentPart::FileUrl { kind, .. } => assert_eq!(kind, "audio_url"),
            other => panic!("expected file part, got {other:?}"),
        }
    }

    #[test]
    fn non_data_url_is_rejected() {
        let err = ContentPart::from_data_url("x.bin", "https://example.com/x.bin").unwrap_err();
        assert!(matches!(err, ClientError::Attachment { .. }));
    }

    #[test]
    fn gql_envelope_tolerates_missing_data() {
        let envelope: GqlEnvelope<ConversationsData> =
            serde_json::from_str(r#"{"errors":[{"message":"nope"}]}"#).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.errors[0].message, "nope");
    }
}
