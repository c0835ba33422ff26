//! GraphQL query documents
//!
//! The service exposes conversations over GraphQL. Documents are assembled
//! from the entity field shape below, so the queried selection always
//! matches what the core entities deserialize.

const METADATA_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "agentId",
    "createdAt",
    "updatedAt",
    "attachmentCount",
    "hasNotifications",
];

const MESSAGE_FIELDS: &[&str] = &[
    "id",
    "role",
    "content",
    "conversationId",
    "parentId",
    "createdAt",
    "updatedAt",
    "feedbackReceived",
];

const ACTIVITY_FIELDS: &[&str] = &[
    "id",
    "title",
    "body",
    "state",
    "parentId",
    "messageId",
    "createdAt",
    "updatedAt",
];

const EDGE_FIELDS: &[&str] = &[
    "id",
    "name",
    "createdAt",
    "updatedAt",
    "attachmentCount",
    "hasNotifications",
    "summary",
];

fn selection(fields: &[&str]) -> String {
    fields.join(" ")
}

/// Query for a single conversation, parameterized by `$conversationId`.
pub fn conversation_query() -> String {
    format!(
        "query Conversation($conversationId: ID!) {{ conversation(conversationId: $conversationId) {{ metadata {{ {metadata} }} messages {{ {messages} activities {{ {activities} kind {{ name }} }} }} }} }}",
        metadata = selection(METADATA_FIELDS),
        messages = selection(MESSAGE_FIELDS),
        activities = selection(ACTIVITY_FIELDS),
    )
}

/// Query for the conversation list edges.
pub fn conversations_query() -> String {
    format!(
        "query Conversations {{ conversations {{ edges {{ {edges} }} }} }}",
        edges = selection(EDGE_FIELDS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced(document: &str) -> bool {
        let mut depth: i32 = 0;
        for c in document.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return false;
            }
        }
        depth == 0
    }

    #[test]
    fn conversation_query_selects_every_entity_field() {
        let document = conversation_query();
        assert!(balanced(&document));
        for field in MESSAGE_FIELDS.iter().chain(ACTIVITY_FIELDS) {
            assert!(document.contains(field), "missing field {field}");
        }
        assert!(document.contains("$conversationId: ID!"));
        assert!(document.contains("kind { name }"));
    }

    #[test]
    fn conversations_query_selects_edges() {
        let document = conversations_query();
        assert!(balanced(&document));
        assert!(document.contains("edges"));
        assert!(document.contains("hasNotifications"));
    }
}
