//! Activity forest assembly
//!
//! Turns one message's flat activity list (with `parent_id` back-references)
//! into a nested forest. Rebuilt from scratch on every call: the builder is
//! pure, deterministic, and holds no cross-call state, so re-deriving after
//! each poll is the supported way to heal out-of-order arrivals.

use crate::{Activity, ActivityId, IntegrityFault};
use std::collections::{HashMap, HashSet};

/// One node of the derived activity forest. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityNode {
    pub activity: Activity,
    pub children: Vec<ActivityNode>,
}

/// Result of a forest build: the roots plus every integrity fault found.
///
/// A faulted activity is excluded from `roots` - never silently dropped
/// (it is reported), never promoted to root, never attached elsewhere.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuiltForest {
    pub roots: Vec<ActivityNode>,
    pub faults: Vec<IntegrityFault>,
}

/// Build the nested forest for a single message's activities.
///
/// Roots are activities without a `parent_id`; every sibling list is ordered
/// by `created_at` ascending with ties broken by `id`, which makes the output
/// identical for any permutation of the input. Nesting depth is unbounded
/// even though the service currently emits at most two levels.
pub fn build_forest(activities: &[Activity]) -> BuiltForest {
    if activities.is_empty() {
        return BuiltForest::default();
    }

    let known: HashSet<ActivityId> = activities.iter().map(|a| a.id).collect();
    let mut faults = Vec::new();
    let mut children_of: HashMap<ActivityId, Vec<&Activity>> = HashMap::new();
    let mut roots: Vec<&Activity> = Vec::new();

    for activity in activities {
        match activity.parent_id {
            None => roots.push(activity),
            Some(parent_id) if known.contains(&parent_id) => {
                children_of.entry(parent_id).or_default().push(activity);
            }
            Some(parent_id) => {
                faults.push(IntegrityFault::UnresolvedParent {
                    activity_id: activity.id,
                    parent_id,
                });
            }
        }
    }

    sort_siblings(&mut roots);
    for siblings in children_of.values_mut() {
        sort_siblings(siblings);
    }

    let mut attached: HashSet<ActivityId> = HashSet::new();
    let roots = roots
        .into_iter()
        .map(|root| assemble(root, &children_of, &mut attached))
        .collect();

    // Anything parented but never reached from a root sits on a cycle.
    for activity in activities {
        if !attached.contains(&activity.id)
            && activity
                .parent_id
                .is_some_and(|parent_id| known.contains(&parent_id))
        {
            faults.push(IntegrityFault::ParentCycle {
                activity_id: activity.id,
            });
        }
    }

    BuiltForest { roots, faults }
}

fn sort_siblings(siblings: &mut [&Activity]) {
    siblings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

fn assemble(
    activity: &Activity,
    children_of: &HashMap<ActivityId, Vec<&Activity>>,
    attached: &mut HashSet<ActivityId>,
) -> ActivityNode {
    attached.insert(activity.id);
    let children = children_of
        .get(&activity.id)
        .map(|children| {
            children
                .iter()
                .map(|child| assemble(child, children_of, attached))
                .collect()
        })
        .unwrap_or_default();
    ActivityNode {
        activity: activity.clone(),
        children,
    }
}
