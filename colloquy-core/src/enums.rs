//! Enumerations shared across the conversation model

use serde::{Deserialize, Serialize};

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageRole {
    User,
    Agent,
    System,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MessageRole::User => "USER",
            MessageRole::Agent => "AGENT",
            MessageRole::System => "SYSTEM",
        };
        f.write_str(label)
    }
}

/// Severity / kind of an agent activity step.
///
/// One flat enum, not a type hierarchy: rendering differences are a lookup
/// over this discriminant on the display side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityState {
    Error,
    Info,
    Success,
    Warn,
    Thought,
    Reflection,
    Execution,
    Diagram,
}

impl ActivityState {
    /// Token used inside legacy `[ACTIVITY][...]` / `[SUBACTIVITY][...]` tags.
    ///
    /// `Success` is the implicit default and is never written as a token.
    pub fn tag_token(&self) -> Option<&'static str> {
        match self {
            ActivityState::Error => Some("ERROR"),
            ActivityState::Info => Some("INFO"),
            ActivityState::Warn => Some("WARN"),
            ActivityState::Thought => Some("THOUGHT"),
            ActivityState::Reflection => Some("REFLECTION"),
            ActivityState::Execution => Some("EXECUTION"),
            ActivityState::Diagram => Some("DIAGRAM"),
            ActivityState::Success => None,
        }
    }

    /// Inverse of [`ActivityState::tag_token`].
    pub fn from_tag_token(token: &str) -> Option<Self> {
        match token {
            "ERROR" => Some(ActivityState::Error),
            "INFO" => Some(ActivityState::Info),
            "WARN" => Some(ActivityState::Warn),
            "THOUGHT" => Some(ActivityState::Thought),
            "REFLECTION" => Some(ActivityState::Reflection),
            "EXECUTION" => Some(ActivityState::Execution),
            "DIAGRAM" => Some(ActivityState::Diagram),
            _ => None,
        }
    }

    pub fn all() -> &'static [ActivityState] {
        &[
            ActivityState::Error,
            ActivityState::Info,
            ActivityState::Success,
            ActivityState::Warn,
            ActivityState::Thought,
            ActivityState::Reflection,
            ActivityState::Execution,
            ActivityState::Diagram,
        ]
    }
}

impl std::fmt::Display for ActivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActivityState::Error => "error",
            ActivityState::Info => "info",
            ActivityState::Success => "success",
            ActivityState::Warn => "warn",
            ActivityState::Thought => "thought",
            ActivityState::Reflection => "reflection",
            ActivityState::Execution => "execution",
            ActivityState::Diagram => "diagram",
        };
        f.write_str(label)
    }
}
