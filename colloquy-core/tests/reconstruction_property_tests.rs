use chrono::{Duration, TimeZone, Utc};
use colloquy_core::{
    build_forest, encode_subactivity, parse_tag, Activity, ActivityId, ActivityNode,
    ActivityState, EntityIdType, IntegrityFault, MessageId, TagKind, Timestamp,
};
use proptest::prelude::*;
use uuid::Uuid;

fn base_time() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn make_activity(
    message_id: MessageId,
    parent_id: Option<ActivityId>,
    state: ActivityState,
    offset_ms: i64,
) -> Activity {
    Activity {
        id: ActivityId::now_v7(),
        title: format!("step +{offset_ms}ms"),
        body: None,
        state,
        kind: None,
        parent_id,
        message_id,
        created_at: base_time() + Duration::milliseconds(offset_ms),
        updated_at: None,
    }
}

/// Fixture: a random single-message activity list. Each entry may pick any
/// earlier entry as its parent, so depth is unbounded.
fn build_fixture(shape: &[(Option<usize>, i64)]) -> Vec<Activity> {
    let message_id = MessageId::now_v7();
    let mut activities: Vec<Activity> = Vec::with_capacity(shape.len());
    for (index, (parent_pick, offset_ms)) in shape.iter().enumerate() {
        let parent_id = parent_pick
            .filter(|_| index > 0)
            .map(|pick| activities[pick % index].id);
        activities.push(make_activity(message_id, parent_id, ActivityState::Info, *offset_ms));
    }
    activities
}

/// Deterministic Fisher-Yates driven by a seed, so every permutation is
/// reachable and shrinkable.
fn shuffle<T>(items: &mut [T], mut seed: u64) {
    for i in (1..items.len()).rev() {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let j = (seed >> 33) as usize % (i + 1);
        items.swap(i, j);
    }
}

fn collect_ids(nodes: &[ActivityNode], into: &mut Vec<ActivityId>) {
    for node in nodes {
        into.push(node.activity.id);
        collect_ids(&node.children, into);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any permutation of the same activity list builds a structurally
    /// identical forest.
    #[test]
    fn forest_build_is_permutation_invariant(
        shape in prop::collection::vec((prop::option::of(0usize..16), 0i64..5_000), 1..12),
        seed in any::<u64>(),
    ) {
        let activities = build_fixture(&shape);
        let baseline = build_forest(&activities);

        let mut permuted = activities.clone();
        shuffle(&mut permuted, seed);
        let rebuilt = build_forest(&permuted);

        prop_assert_eq!(baseline.roots, rebuilt.roots);
        let mut base_faults = baseline.faults;
        let mut other_faults = rebuilt.faults;
        base_faults.sort_by_key(|f| format!("{f}"));
        other_faults.sort_by_key(|f| format!("{f}"));
        prop_assert_eq!(base_faults, other_faults);
    }

    /// An unresolvable parent reference never attaches the activity to an
    /// unrelated node: the orphan lands in `faults` and nowhere in the tree.
    #[test]
    fn orphans_never_attach_to_unrelated_roots(
        shape in prop::collection::vec((prop::option::of(0usize..16), 0i64..5_000), 1..10),
        orphan_offset in 0i64..5_000,
    ) {
        let mut activities = build_fixture(&shape);
        let message_id = activities[0].message_id;
        let ghost = ActivityId::now_v7();
        let orphan = make_activity(message_id, Some(ghost), ActivityState::Warn, orphan_offset);
        let orphan_id = orphan.id;
        activities.push(orphan);

        let built = build_forest(&activities);
        let mut tree_ids = Vec::new();
        collect_ids(&built.roots, &mut tree_ids);
        prop_assert!(!tree_ids.contains(&orphan_id));
        let has_unresolved_parent = built.faults.contains(&IntegrityFault::UnresolvedParent {
            activity_id: orphan_id,
            parent_id: ghost,
        });
        prop_assert!(has_unresolved_parent);
    }

    /// Every activity is either in the forest or reported - nothing vanishes.
    #[test]
    fn every_activity_is_placed_or_reported(
        shape in prop::collection::vec((prop::option::of(0usize..16), 0i64..5_000), 1..12),
    ) {
        let activities = build_fixture(&shape);
        let built = build_forest(&activities);
        let mut tree_ids = Vec::new();
        collect_ids(&built.roots, &mut tree_ids);
        prop_assert_eq!(tree_ids.len() + built.faults.len(), activities.len());
    }

    /// Tag encoding round-trips through the decoder for every state.
    #[test]
    fn subactivity_tags_round_trip(
        state_index in 0usize..8,
        parent_bits in any::<u128>(),
        body in "[a-zA-Z0-9 ,.!?:]{0,60}",
    ) {
        let state = ActivityState::all()[state_index];
        let parent = ActivityId::new(Uuid::from_u128(parent_bits));
        let encoded = encode_subactivity(state, parent, &body);
        let tag = parse_tag(&encoded).expect("encoded tags always parse");
        prop_assert_eq!(tag.kind, TagKind::Subactivity);
        prop_assert_eq!(tag.state, state);
        prop_assert_eq!(tag.parent_ref.unwrap(), parent.to_string());
        prop_assert_eq!(tag.body, body.as_str());
    }
}
