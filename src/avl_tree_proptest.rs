#![cfg(test)]

// Property tests for AvlTree kept inside the crate so they can assert the
// per-node structural invariants (BST order, cached heights, AVL balance)
// through internal access after every operation.

use crate::avl_tree::AvlTree;
use proptest::prelude::*;
use std::collections::BTreeMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<i32>, Vec<OpI>)> {
    proptest::collection::vec(-64i32..64, 1..=16).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Get),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::BTreeMap,
// with the structural invariants re-verified after every mutation:
// - insert/remove return the same previous value as the model;
// - get parity and len parity after each op;
// - BST order, cached-height correctness and AVL balance hold at every node;
// - in-order iteration equals the model's sorted entries;
// - the rotation counter never decreases.
proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]
    #[test]
    fn prop_tree_matches_btreemap((pool, ops) in arb_scenario()) {
        let mut sut: AvlTree<i32, i32> = AvlTree::new();
        let mut model: BTreeMap<i32, i32> = BTreeMap::new();
        let mut last_rotations = 0u64;

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.insert(k, v), model.insert(k, v));
                }
                OpI::Remove(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                }
                OpI::Get(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                }
            }

            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.rotation_count() >= last_rotations);
            last_rotations = sut.rotation_count();
        }

        let entries: Vec<(i32, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i32, i32)> = model.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(entries, expected);
    }
}

// Property: the AVL height bound holds for any distinct-key insert order.
// With n nodes the height is at most 1.4405 * log2(n + 2).
proptest! {
    #[test]
    fn prop_height_stays_logarithmic(keys in proptest::collection::hash_set(any::<i32>(), 1..512)) {
        let mut sut: AvlTree<i32, ()> = AvlTree::new();
        for k in &keys {
            sut.insert(*k, ());
        }
        sut.assert_invariants();

        let n = keys.len() as f64;
        let bound = (1.4405 * (n + 2.0).log2()).ceil() as usize;
        prop_assert!(sut.height() <= bound, "height {} > bound {}", sut.height(), bound);
    }
}

// Property: draining the tree by key leaves it empty and balanced at every
// intermediate step, and every removal yields the inserted value.
proptest! {
    #[test]
    fn prop_drain_to_empty(keys in proptest::collection::hash_set(-1000i32..1000, 1..128)) {
        let mut sut: AvlTree<i32, i32> = AvlTree::new();
        for k in &keys {
            sut.insert(*k, k.wrapping_mul(7));
        }

        let mut sorted: Vec<i32> = keys.iter().copied().collect();
        sorted.sort_unstable();
        for k in sorted {
            prop_assert_eq!(sut.remove(&k), Some(k.wrapping_mul(7)));
            sut.assert_invariants();
        }
        prop_assert!(sut.is_empty());
        prop_assert_eq!(sut.height(), 0);
    }
}
