//! Size bound, eviction order and deterministic retrieval of the context store

use proptest::prelude::*;
use storyloom::context::{ContextCategory, ContextPoint, ContextStore};

const CRITICAL_WEIGHT: u32 = 5;

fn category() -> impl Strategy<Value = ContextCategory> {
    prop_oneof![
        Just(ContextCategory::Plot),
        Just(ContextCategory::Character),
        Just(ContextCategory::Setting),
        Just(ContextCategory::Theme),
    ]
}

fn point() -> impl Strategy<Value = ContextPoint> {
    ("[a-z]{1,12}", category(), 1u32..=6, 1u32..=12)
        .prop_map(|(text, category, weight, chapter)| ContextPoint::new(text, category, weight, chapter))
}

fn build(max_points: usize, points: &[ContextPoint]) -> ContextStore {
    let mut store = ContextStore::new(max_points, CRITICAL_WEIGHT);
    for p in points {
        store.add_point(p.clone());
    }
    store
}

fn critical_count<'a>(points: impl Iterator<Item = &'a ContextPoint>) -> usize {
    points.filter(|p| p.weight() >= CRITICAL_WEIGHT).count()
}

proptest! {
    #[test]
    fn size_never_exceeds_cap(max_points in 1usize..20, points in prop::collection::vec(point(), 0..80)) {
        let mut store = ContextStore::new(max_points, CRITICAL_WEIGHT);
        for (added, p) in points.into_iter().enumerate() {
            store.add_point(p);
            prop_assert!(store.len() <= max_points);
            prop_assert_eq!(store.len(), (added + 1).min(max_points));
        }
    }

    #[test]
    fn critical_points_outlive_non_critical(max_points in 1usize..12, points in prop::collection::vec(point(), 0..60)) {
        let mut store = ContextStore::new(max_points, CRITICAL_WEIGHT);
        for p in points {
            let expected_critical = critical_count(store.points()) + usize::from(store.is_critical(&p));
            store.add_point(p);
            let remaining_critical = critical_count(store.points());
            if remaining_critical < expected_critical {
                // A critical point may only go once nothing else is left to evict.
                prop_assert!(store.points().all(|q| store.is_critical(q)));
            }
        }
    }

    #[test]
    fn retrieval_is_deterministic_and_ranked(
        max_points in 1usize..25,
        points in prop::collection::vec(point(), 0..60),
        chapter in 1u32..14,
        limit in 0usize..30,
    ) {
        let first = build(max_points, &points);
        let second = build(max_points, &points);
        let a = first.get_context_for_chapter(chapter, limit);
        let b = second.get_context_for_chapter(chapter, limit);
        prop_assert_eq!(&a, &b);

        prop_assert!(a.len() <= limit);
        prop_assert!(a.iter().all(|p| p.origin_chapter() < chapter));
        for pair in a.windows(2) {
            let (hi, lo) = (pair[0], pair[1]);
            prop_assert!(
                hi.weight() > lo.weight()
                    || (hi.weight() == lo.weight() && hi.origin_chapter() >= lo.origin_chapter())
            );
        }
    }

    #[test]
    fn prune_is_idempotent(max_points in 1usize..15, points in prop::collection::vec(point(), 0..50)) {
        let mut store = build(max_points, &points);
        let before: Vec<ContextPoint> = store.points().cloned().collect();
        store.prune();
        let after: Vec<ContextPoint> = store.points().cloned().collect();
        prop_assert_eq!(before, after);
    }
}
