//! Fault types surfaced by the reconstruction pipeline
//!
//! Faults are data, not exceptions: builders and decoders return them
//! alongside the partial result so callers can log, retry, or render a
//! degraded view. Nothing here aborts a whole conversation.

use crate::{ActivityId, MessageId};
use thiserror::Error;

/// Integrity violation in structured activity data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityFault {
    /// An activity references a parent id that does not exist in the same
    /// message's activity list.
    #[error("activity {activity_id} references missing parent {parent_id}")]
    UnresolvedParent {
        activity_id: ActivityId,
        parent_id: ActivityId,
    },

    /// An activity's parent chain loops back on itself, so it is reachable
    /// from no root.
    #[error("activity {activity_id} participates in a parent reference cycle")]
    ParentCycle { activity_id: ActivityId },

    /// An activity was attached to a message it does not belong to.
    #[error("activity {activity_id} belongs to message {owner} but was supplied with message {found}")]
    ForeignActivity {
        activity_id: ActivityId,
        owner: MessageId,
        found: MessageId,
    },
}

/// Fault produced while decoding the legacy tag-encoded message stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeFault {
    /// A `[SUBACTIVITY]` entry names a parent that is not present among the
    /// current message's decoded activities (or sits deeper than the one
    /// level of indirection the legacy format supports).
    #[error("subactivity {entry_id} references missing parent {parent_ref}: {content}")]
    MissingParent {
        entry_id: MessageId,
        parent_ref: String,
        content: String,
    },

    /// A `[SUBACTIVITY]` entry carries no parent reference at all.
    #[error("subactivity {entry_id} carries no parent reference: {content}")]
    UnparentedSubactivity { entry_id: MessageId, content: String },

    /// A tagged entry appeared before any untagged message existed to
    /// anchor it.
    #[error("tagged entry {entry_id} has no preceding message to attach to: {content}")]
    MissingAnchor { entry_id: MessageId, content: String },
}
