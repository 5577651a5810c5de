use proptest::prelude::*;
use scapegoat_collections::{ScapegoatMap, DEFAULT_ALPHA};
use std::collections::BTreeMap as StdMap;
use std::ops::Bound;

mod common;
use common::*;

fn check_parity(map: &ScapegoatMap<u16, u16>, std_map: &StdMap<u16, u16>) {
    assert_eq!(map.len(), std_map.len());
    assert_eq!(map.is_empty(), std_map.is_empty());
    assert!(map.iter().eq(std_map.iter()));

    match std_map.first_key_value() {
        Some((_, v)) => assert_eq!(map.minimum(), Ok(v)),
        None => assert!(map.minimum().is_err()),
    }
    match std_map.last_key_value() {
        Some((_, v)) => assert_eq!(map.maximum(), Ok(v)),
        None => assert!(map.maximum().is_err()),
    }
}

proptest! {
    #[test]
    fn insert_parity(pairs in small_int_pairs()) {
        let mut map = ScapegoatMap::new();
        let mut std_map = StdMap::new();

        for (k, v) in pairs {
            assert_eq!(map.insert(k, v), std_map.insert(k, v));
            assert_eq!(map.get(&k), std_map.get(&k));
            assert!(map.contains(&k));
        }

        check_parity(&map, &std_map);
    }

    #[test]
    fn insert_remove_parity(pairs in small_int_pairs(), doomed in small_int_pairs()) {
        let mut map = ScapegoatMap::new();
        let mut std_map = StdMap::new();
        for (k, v) in pairs {
            map.insert(k, v);
            std_map.insert(k, v);
        }

        for (k, _) in doomed {
            assert_eq!(map.remove(&k), std_map.remove(&k));
            assert_eq!(map.get(&k), None);
        }

        check_parity(&map, &std_map);
    }

    #[test]
    fn bulk_then_rebuild_parity(pairs in small_int_pairs()) {
        let mut map = ScapegoatMap::new();
        let mut std_map = StdMap::new();
        for (k, v) in pairs {
            assert_eq!(map.insert_without_rebalancing(k, v), std_map.insert(k, v));
        }

        map.rebuild();
        check_parity(&map, &std_map);
    }

    #[test]
    fn order_statistic_parity(pairs in small_int_pairs(), probe in 0u16..1024) {
        let map: ScapegoatMap<_, _> = pairs.iter().copied().collect();
        let std_map: StdMap<_, _> = pairs.into_iter().collect();

        let succ = std_map
            .range((Bound::Excluded(probe), Bound::Unbounded))
            .next()
            .map(|(_, v)| v);
        assert_eq!(map.successor(&probe), succ);

        let pred = std_map.range(..probe).next_back().map(|(_, v)| v);
        assert_eq!(map.predecessor(&probe), pred);
    }

    #[test]
    fn traversal_parity(pairs in small_int_pairs()) {
        let map: ScapegoatMap<_, _> = pairs.iter().copied().collect();
        let std_map: StdMap<_, _> = pairs.into_iter().collect();

        assert!(map.in_order().eq(std_map.values()));
        assert!(map.keys().eq(std_map.keys()));
        assert!(map.values().eq(std_map.values()));

        // pre- and postorder visit the same entries, root first and root
        // last respectively
        let pre: Vec<u16> = map.preorder().copied().collect();
        let post: Vec<u16> = map.postorder().copied().collect();
        assert_eq!(pre.len(), map.len());
        assert_eq!(post.len(), map.len());
        assert_eq!(pre.first(), post.last());

        let mut in_order: Vec<u16> = map.in_order().copied().collect();
        in_order.sort_unstable();
        let mut pre_sorted = pre;
        pre_sorted.sort_unstable();
        let mut post_sorted = post;
        post_sorted.sort_unstable();
        assert_eq!(pre_sorted, in_order);
        assert_eq!(post_sorted, in_order);
    }

    #[test]
    fn depth_stays_bounded(pairs in small_int_pairs()) {
        let map: ScapegoatMap<_, _> = pairs.into_iter().collect();

        if map.is_empty() {
            assert_eq!(map.depth(), -1);
        } else {
            let bound =
                ((map.len() as f64).ln() / (1.0 / DEFAULT_ALPHA).ln()).floor() as isize;
            assert!(map.depth() <= bound);
        }
    }
}
