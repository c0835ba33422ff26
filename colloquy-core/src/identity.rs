//! Identity types for Colloquy entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Common behavior shared by every typed entity id.
pub trait EntityIdType: Copy {
    fn new(id: Uuid) -> Self;
    fn as_uuid(&self) -> Uuid;

    /// Fresh UUIDv7 id (timestamp-sortable).
    fn now_v7() -> Self
    where
        Self: Sized,
    {
        Self::new(Uuid::now_v7())
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl EntityIdType for $name {
            fn new(id: Uuid) -> Self {
                Self(id)
            }

            fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id! {
    /// Identifier of a conversation.
    ConversationId
}

entity_id! {
    /// Identifier of a chat message within a conversation.
    MessageId
}

entity_id! {
    /// Identifier of an agent activity attached to a message.
    ActivityId
}

entity_id! {
    /// Identifier of the agent configured for a conversation.
    AgentId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entity_id_is_v7() {
        let id = new_entity_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn typed_ids_round_trip_through_uuid() {
        let raw = Uuid::new_v4();
        let id = MessageId::new(raw);
        assert_eq!(id.as_uuid(), raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[test]
    fn typed_ids_serialize_transparently() {
        let raw = Uuid::new_v4();
        let id = ActivityId::new(raw);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", raw));
        let back: ActivityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
