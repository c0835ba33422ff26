//! Render projection
//!
//! Maps a conversation snapshot into the ordered sequence the display layer
//! consumes: one item per message, each carrying the forest built from its
//! own activities. Activities never nest across messages.

use crate::{build_forest, ActivityNode, Conversation, IntegrityFault, Message};

/// One renderable unit: a message plus its derived activity forest.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    pub message: Message,
    pub activity_forest: Vec<ActivityNode>,
}

/// Projection of a full conversation snapshot.
///
/// Purely derived: projecting the same snapshot twice yields deep-equal
/// output, and no state survives between calls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    pub items: Vec<DisplayItem>,
    pub faults: Vec<IntegrityFault>,
}

/// Project a conversation into display order.
///
/// Messages are ordered by `created_at` ascending (ties by `id`). An
/// activity delivered under a message it does not belong to is excluded
/// from that message's forest and reported as a fault.
pub fn project(conversation: &Conversation) -> Projection {
    let mut items = Vec::with_capacity(conversation.messages.len());
    let mut faults = Vec::new();

    for message in conversation.sorted_messages() {
        let mut own = Vec::with_capacity(message.activities.len());
        for activity in &message.activities {
            if activity.message_id == message.id {
                own.push(activity.clone());
            } else {
                faults.push(IntegrityFault::ForeignActivity {
                    activity_id: activity.id,
                    owner: activity.message_id,
                    found: message.id,
                });
            }
        }

        let built = build_forest(&own);
        faults.extend(built.faults);
        items.push(DisplayItem {
            message: message.clone(),
            activity_forest: built.roots,
        });
    }

    Projection { items, faults }
}
