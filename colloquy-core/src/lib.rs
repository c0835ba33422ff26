//! Colloquy Core - Conversation Entities and Reconstruction
//!
//! Pure data types plus the reconstruction pipeline: legacy tag decoding,
//! activity forest assembly, and the render projection. No IO, no async,
//! no logging - callers decide what to do with reported faults.

pub mod entities;
pub mod enums;
pub mod error;
pub mod forest;
pub mod identity;
pub mod projection;
pub mod tags;

pub use entities::{
    Activity, ActivityKind, Conversation, ConversationEdge, ConversationMetadata, Message,
};
pub use enums::{ActivityState, MessageRole};
pub use error::{DecodeFault, IntegrityFault};
pub use forest::{build_forest, ActivityNode, BuiltForest};
pub use identity::{
    new_entity_id, ActivityId, AgentId, ConversationId, EntityId, EntityIdType, MessageId,
    Timestamp,
};
pub use projection::{project, DisplayItem, Projection};
pub use tags::{
    decode_conversation, encode_activity, encode_subactivity, parse_tag, DecodedConversation,
    ParsedTag, RawMessage, TagKind,
};
