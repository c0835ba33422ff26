//! Legacy tag codec
//!
//! Conversations persisted before activities became structured rows encode
//! them as tagged message content:
//!
//! ```text
//! [ACTIVITY] body
//! [ACTIVITY][ERROR] body
//! [SUBACTIVITY][<parent-id>] body
//! [SUBACTIVITY][THOUGHT][<parent-id>] body
//! ```
//!
//! A missing STATE token means SUCCESS. The decoder lifts these entries into
//! the same structured [`Activity`] shape the service emits today, attached
//! to the most recent untagged message. A malformed entry is reported as a
//! [`DecodeFault`] and skipped; it never aborts the rest of the stream.

use crate::{
    Activity, ActivityId, ActivityState, ConversationId, DecodeFault, EntityIdType, Message,
    MessageId, MessageRole, Timestamp,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static TAG_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(ACTIVITY|SUBACTIVITY)\](?:\[([^\[\]]+)\])?(?:\[([^\[\]]+)\])?")
        .expect("tag prefix pattern is valid")
});

/// Which control tag opened the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Activity,
    Subactivity,
}

/// Decoded control-tag prefix of a raw content string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag<'a> {
    pub kind: TagKind,
    pub state: ActivityState,
    /// Raw parent reference for subactivities. Left unparsed so resolution
    /// failures can report exactly what the stream contained.
    pub parent_ref: Option<&'a str>,
    pub body: &'a str,
}

/// Recognize a leading control tag. Returns `None` for ordinary content,
/// including content that merely resembles a tag (unknown STATE token,
/// missing space separator): such entries pass through as plain messages,
/// matching how the product always rendered them.
pub fn parse_tag(content: &str) -> Option<ParsedTag<'_>> {
    let captures = TAG_PREFIX.captures(content)?;
    let prefix_end = captures.get(0).map(|m| m.end())?;
    let body = match content[prefix_end..].strip_prefix(' ') {
        Some(rest) => rest,
        None if content.len() == prefix_end => "",
        None => return None,
    };

    let kind = match captures.get(1).map(|m| m.as_str()) {
        Some("ACTIVITY") => TagKind::Activity,
        Some("SUBACTIVITY") => TagKind::Subactivity,
        _ => return None,
    };
    let first = captures.get(2).map(|m| m.as_str());
    let second = captures.get(3).map(|m| m.as_str());

    let (state, parent_ref) = match kind {
        TagKind::Activity => match (first, second) {
            (None, None) => (ActivityState::Success, None),
            (Some(token), None) => (ActivityState::from_tag_token(token)?, None),
            _ => return None,
        },
        TagKind::Subactivity => match (first, second) {
            (None, None) => (ActivityState::Success, None),
            // A lone bracket is a parent reference unless it names a STATE.
            (Some(token), None) => match ActivityState::from_tag_token(token) {
                Some(state) => (state, None),
                None => (ActivityState::Success, Some(token)),
            },
            (Some(token), Some(parent)) => (ActivityState::from_tag_token(token)?, Some(parent)),
            _ => return None,
        },
    };

    Some(ParsedTag {
        kind,
        state,
        parent_ref,
        body,
    })
}

/// Encode a root activity in the legacy tag form.
pub fn encode_activity(state: ActivityState, body: &str) -> String {
    match state.tag_token() {
        Some(token) => format!("[ACTIVITY][{token}] {body}"),
        None => format!("[ACTIVITY] {body}"),
    }
}

/// Encode a subactivity in the legacy tag form.
pub fn encode_subactivity(state: ActivityState, parent_id: ActivityId, body: &str) -> String {
    match state.tag_token() {
        Some(token) => format!("[SUBACTIVITY][{token}][{parent_id}] {body}"),
        None => format!("[SUBACTIVITY][{parent_id}] {body}"),
    }
}

/// Raw message as persisted by the legacy service: no structured activities,
/// control entries inline in `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub feedback_received: bool,
}

/// Result of decoding a legacy stream: structured messages plus every fault
/// encountered along the way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedConversation {
    pub messages: Vec<Message>,
    pub faults: Vec<DecodeFault>,
}

/// Decode a legacy tag-encoded message stream into the structured shape.
///
/// The stream is order-dependent: tagged entries attach to the most recent
/// untagged message, and subactivity parents must already have been decoded
/// for the same message. Re-run over the full list on every poll - an entry
/// whose parent arrives later heals on the next reconstruction.
pub fn decode_conversation(
    conversation_id: ConversationId,
    raw_messages: &[RawMessage],
) -> DecodedConversation {
    let mut messages: Vec<Message> = Vec::new();
    let mut faults: Vec<DecodeFault> = Vec::new();

    for raw in raw_messages {
        let Some(tag) = parse_tag(&raw.content) else {
            messages.push(Message {
                id: raw.id,
                role: raw.role,
                content: raw.content.clone(),
                conversation_id,
                parent_id: None,
                created_at: raw.created_at,
                updated_at: raw.updated_at,
                feedback_received: raw.feedback_received,
                activities: Vec::new(),
            });
            continue;
        };

        let Some(anchor) = messages.last_mut() else {
            faults.push(DecodeFault::MissingAnchor {
                entry_id: raw.id,
                content: raw.content.clone(),
            });
            continue;
        };

        let parent_id = match tag.kind {
            TagKind::Activity => None,
            TagKind::Subactivity => {
                let Some(parent_ref) = tag.parent_ref else {
                    faults.push(DecodeFault::UnparentedSubactivity {
                        entry_id: raw.id,
                        content: raw.content.clone(),
                    });
                    continue;
                };
                match resolve_parent(&anchor.activities, parent_ref) {
                    Some(parent_id) => Some(parent_id),
                    None => {
                        faults.push(DecodeFault::MissingParent {
                            entry_id: raw.id,
                            parent_ref: parent_ref.to_string(),
                            content: raw.content.clone(),
                        });
                        continue;
                    }
                }
            }
        };

        let (title, body) = split_title_body(tag.body);
        anchor.activities.push(Activity {
            id: ActivityId::new(raw.id.as_uuid()),
            title,
            body,
            state: tag.state,
            kind: None,
            parent_id,
            message_id: anchor.id,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        });
    }

    DecodedConversation { messages, faults }
}

/// Find a subactivity parent among the anchor message's decoded activities.
/// Only roots and their direct children qualify: the legacy format checked
/// exactly one level of indirection, and deeper references never resolved.
fn resolve_parent(activities: &[Activity], parent_ref: &str) -> Option<ActivityId> {
    let wanted = ActivityId::new(Uuid::parse_str(parent_ref).ok()?);
    let parent = activities.iter().find(|a| a.id == wanted)?;
    match parent.parent_id {
        None => Some(parent.id),
        Some(grandparent_id) => {
            let grandparent = activities.iter().find(|a| a.id == grandparent_id)?;
            if grandparent.parent_id.is_none() {
                Some(parent.id)
            } else {
                None
            }
        }
    }
}

/// First body line is the activity title (a trailing `:` is cosmetic),
/// everything after it is the detail body.
fn split_title_body(body: &str) -> (String, Option<String>) {
    let mut lines = body.splitn(2, '\n');
    let title = lines
        .next()
        .unwrap_or("")
        .trim()
        .trim_end_matches(':')
        .to_string();
    let detail = lines
        .next()
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
        .map(str::to_string);
    (title, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_raw(role: MessageRole, content: &str, offset_ms: i64) -> RawMessage {
        RawMessage {
            id: MessageId::now_v7(),
            role,
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
                + Duration::milliseconds(offset_ms),
            updated_at: None,
            feedback_received: false,
        }
    }

    #[test]
    fn bare_activity_defaults_to_success() {
        let tag = parse_tag("[ACTIVITY] Running tools").unwrap();
        assert_eq!(tag.kind, TagKind::Activity);
        assert_eq!(tag.state, ActivityState::Success);
        assert_eq!(tag.parent_ref, None);
        assert_eq!(tag.body, "Running tools");
    }

    #[test]
    fn activity_with_state_token() {
        let tag = parse_tag("[ACTIVITY][ERROR] Command failed").unwrap();
        assert_eq!(tag.state, ActivityState::Error);
        assert_eq!(tag.body, "Command failed");
    }

    #[test]
    fn subactivity_single_bracket_is_parent_not_state() {
        let parent = ActivityId::now_v7();
        let content = format!("[SUBACTIVITY][{parent}] Searched web");
        let tag = parse_tag(&content).unwrap();
        assert_eq!(tag.kind, TagKind::Subactivity);
        assert_eq!(tag.state, ActivityState::Success);
        assert_eq!(tag.parent_ref.unwrap(), parent.to_string());
        assert_eq!(tag.body, "Searched web");
    }

    #[test]
    fn subactivity_with_state_and_parent() {
        let parent = ActivityId::now_v7();
        let content = format!("[SUBACTIVITY][THOUGHT][{parent}] Considering options");
        let tag = parse_tag(&content).unwrap();
        assert_eq!(tag.state, ActivityState::Thought);
        assert_eq!(tag.parent_ref.unwrap(), parent.to_string());
    }

    #[test]
    fn unknown_state_token_is_not_a_tag() {
        assert!(parse_tag("[ACTIVITY][BOGUS] text").is_none());
        let parent = ActivityId::now_v7();
        assert!(parse_tag(&format!("[SUBACTIVITY][BOGUS][{parent}] text")).is_none());
    }

    #[test]
    fn missing_space_separator_is_not_a_tag() {
        assert!(parse_tag("[ACTIVITY]glued").is_none());
    }

    #[test]
    fn prefix_without_body_parses_with_empty_body() {
        let tag = parse_tag("[ACTIVITY]").unwrap();
        assert_eq!(tag.body, "");
    }

    #[test]
    fn plain_content_is_not_a_tag() {
        assert!(parse_tag("hello [ACTIVITY] world").is_none());
        assert!(parse_tag("just a message").is_none());
    }

    #[test]
    fn activity_encoding_round_trips() {
        for state in ActivityState::all() {
            let encoded = encode_activity(*state, "Running tools");
            let tag = parse_tag(&encoded).unwrap();
            assert_eq!(tag.kind, TagKind::Activity);
            assert_eq!(tag.state, *state);
            assert_eq!(tag.parent_ref, None);
            assert_eq!(tag.body, "Running tools");
        }
    }

    #[test]
    fn encode_decode_round_trip_preserves_state_parent_and_body() {
        let parent = ActivityId::now_v7();
        for state in ActivityState::all() {
            let encoded = encode_subactivity(*state, parent, "Checked the docs");
            let tag = parse_tag(&encoded).unwrap();
            assert_eq!(tag.kind, TagKind::Subactivity);
            assert_eq!(tag.state, *state);
            assert_eq!(tag.parent_ref.unwrap(), parent.to_string());
            assert_eq!(tag.body, "Checked the docs");
        }
    }

    #[test]
    fn decode_attaches_activities_to_preceding_message() {
        let conversation_id = ConversationId::now_v7();
        let user = make_raw(MessageRole::User, "find me a flight", 0);
        let agent = make_raw(MessageRole::Agent, "Looking into it", 10);
        let root = make_raw(MessageRole::Agent, "[ACTIVITY] Planning", 20);
        let child_content = format!(
            "[SUBACTIVITY][EXECUTION][{}] Searched flights",
            ActivityId::new(root.id.as_uuid())
        );
        let child = make_raw(MessageRole::Agent, &child_content, 30);

        let decoded =
            decode_conversation(conversation_id, &[user.clone(), agent.clone(), root, child]);
        assert!(decoded.faults.is_empty());
        assert_eq!(decoded.messages.len(), 2);
        assert!(decoded.messages[0].activities.is_empty());
        let activities = &decoded.messages[1].activities;
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].title, "Planning");
        assert_eq!(activities[0].parent_id, None);
        assert_eq!(activities[1].parent_id, Some(activities[0].id));
        assert_eq!(activities[1].state, ActivityState::Execution);
        assert!(activities.iter().all(|a| a.message_id == decoded.messages[1].id));
    }

    #[test]
    fn decode_resolves_parent_one_level_deep_but_not_two() {
        let conversation_id = ConversationId::now_v7();
        let anchor = make_raw(MessageRole::Agent, "Working", 0);
        let root = make_raw(MessageRole::Agent, "[ACTIVITY] Level zero", 10);
        let root_id = ActivityId::new(root.id.as_uuid());
        let mid = make_raw(
            MessageRole::Agent,
            &format!("[SUBACTIVITY][{root_id}] Level one"),
            20,
        );
        let mid_id = ActivityId::new(mid.id.as_uuid());
        let deep = make_raw(
            MessageRole::Agent,
            &format!("[SUBACTIVITY][{mid_id}] Level two"),
            30,
        );
        let deep_id = ActivityId::new(deep.id.as_uuid());
        let too_deep = make_raw(
            MessageRole::Agent,
            &format!("[SUBACTIVITY][{deep_id}] Level three"),
            40,
        );

        let decoded = decode_conversation(conversation_id, &[anchor, root, mid, deep, too_deep]);
        // Level two resolves (its parent is one level deep); level three's
        // parent is two levels deep and never resolved in the legacy format.
        assert_eq!(decoded.messages[0].activities.len(), 3);
        assert_eq!(decoded.faults.len(), 1);
        assert!(matches!(
            &decoded.faults[0],
            DecodeFault::MissingParent { parent_ref, .. } if *parent_ref == deep_id.to_string()
        ));
    }

    #[test]
    fn missing_parent_is_skipped_and_reported_without_aborting() {
        let conversation_id = ConversationId::now_v7();
        let anchor = make_raw(MessageRole::Agent, "Working", 0);
        let ghost = ActivityId::now_v7();
        let stray = make_raw(
            MessageRole::Agent,
            &format!("[SUBACTIVITY][INFO][{ghost}] Stray"),
            10,
        );
        let good = make_raw(MessageRole::Agent, "[ACTIVITY] Recovered", 20);

        let decoded = decode_conversation(conversation_id, &[anchor, stray.clone(), good]);
        assert_eq!(decoded.messages.len(), 1);
        assert_eq!(decoded.messages[0].activities.len(), 1);
        assert_eq!(decoded.messages[0].activities[0].title, "Recovered");
        assert_eq!(
            decoded.faults,
            vec![DecodeFault::MissingParent {
                entry_id: stray.id,
                parent_ref: ghost.to_string(),
                content: stray.content,
            }]
        );
    }

    #[test]
    fn tagged_entry_before_any_message_is_an_anchor_fault() {
        let conversation_id = ConversationId::now_v7();
        let stray = make_raw(MessageRole::Agent, "[ACTIVITY] Too early", 0);
        let decoded = decode_conversation(conversation_id, &[stray.clone()]);
        assert!(decoded.messages.is_empty());
        assert_eq!(
            decoded.faults,
            vec![DecodeFault::MissingAnchor {
                entry_id: stray.id,
                content: stray.content,
            }]
        );
    }

    #[test]
    fn unparented_subactivity_is_a_fault() {
        let conversation_id = ConversationId::now_v7();
        let anchor = make_raw(MessageRole::Agent, "Working", 0);
        let stray = make_raw(MessageRole::Agent, "[SUBACTIVITY] Floating", 10);
        let decoded = decode_conversation(conversation_id, &[anchor, stray.clone()]);
        assert_eq!(
            decoded.faults,
            vec![DecodeFault::UnparentedSubactivity {
                entry_id: stray.id,
                content: stray.content,
            }]
        );
    }

    #[test]
    fn title_splits_from_body_and_drops_trailing_colon() {
        let (title, body) = split_title_body("Searching the web:\nquery: rust forests\ndone");
        assert_eq!(title, "Searching the web");
        assert_eq!(body.as_deref(), Some("query: rust forests\ndone"));

        let (title, body) = split_title_body("Just a title");
        assert_eq!(title, "Just a title");
        assert_eq!(body, None);
    }
}
