use super::*;

use crate::node::Ptr;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Walks the whole tree and checks every structural invariant:
/// parent links, strict key order, stored balances against real heights,
/// and the live count.
fn validate_tree<K: Ord + std::fmt::Debug, V>(t: &AvlTree<K, V>) {
    let bst = t.inner();
    let nodes = &bst.nodes;

    if !bst.root.is_null() {
        assert!(nodes.parent(bst.root).is_null(), "root must have no parent");
    }

    let heights = bst.subtree_heights();
    let h = |ptr: Ptr| if ptr.is_null() { 0 } else { heights[ptr.idx()] as i64 };

    let reachable = bst.preorder();
    for &ptr in &reachable {
        let node = &nodes[ptr];
        for child in [node.left, node.right] {
            if !child.is_null() {
                assert_eq!(
                    nodes.parent(child),
                    ptr,
                    "child of {:?} must point back to it",
                    node.key
                );
            }
        }
        if !node.left.is_null() {
            assert!(nodes[node.left].key < node.key, "left child out of order");
        }
        if !node.right.is_null() {
            assert!(nodes[node.right].key > node.key, "right child out of order");
        }

        let actual = h(node.right) - h(node.left);
        assert_eq!(
            i64::from(node.balance),
            actual,
            "stored balance of {:?} must match subtree heights",
            node.key
        );
        assert!(actual.abs() <= 1, "{:?} is out of balance: {actual}", node.key);
    }

    assert_eq!(reachable.len(), t.len(), "reachable node count must match len");

    let keys: Vec<&K> = t.keys().collect();
    assert!(
        keys.windows(2).all(|w| w[0] < w[1]),
        "in-order keys must be strictly increasing"
    );
    assert!(t.height() <= height_bound(t.len()));
}

/// `(key, parent key, balance)` for every node, in key order.
fn shape<V>(t: &AvlTree<u16, V>) -> Vec<(u16, Option<u16>, i8)> {
    let nodes = &t.inner().nodes;
    let mut out: Vec<_> = t
        .inner()
        .preorder()
        .into_iter()
        .map(|p| {
            let parent = nodes.parent(p);
            (nodes[p].key, (!parent.is_null()).then(|| nodes[parent].key), nodes[p].balance)
        })
        .collect();
    out.sort();
    out
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(#[proptest(strategy = "0u16..512")] u16, u64),
    Remove(#[proptest(strategy = "0u16..512")] u16),
    Get(#[proptest(strategy = "0u16..512")] u16),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=2000)
}

fn keys_strategy() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..1024, 0..=300)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: AvlTree<u16, u64> = AvlTree::new();
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let old_t = t.insert(key, value);
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Remove(key) => {
                    let old_t = t.remove(&key);
                    let old_m = m.remove(&key);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let got: Vec<(u16, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u64)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_validate_after_every_op(keys in keys_strategy(), removals in keys_strategy()) {
        let mut t: AvlTree<u16, ()> = AvlTree::new();
        for k in keys {
            t.insert(k, ());
            validate_tree(&t);
        }
        for k in removals {
            t.remove(&k);
            validate_tree(&t);
        }
    }

    #[test]
    fn prop_reinsert_keeps_single_entry(keys in keys_strategy(), key in 0u16..1024) {
        let mut t: AvlTree<u16, u32> = keys.into_iter().map(|k| (k, 0)).collect();
        let len = t.len();
        let had = t.contains_key(&key);

        t.insert(key, 1);
        let shape_once = shape(&t);
        t.insert(key, 2);

        prop_assert_eq!(t.len(), if had { len } else { len + 1 });
        prop_assert_eq!(t.get(&key), Some(&2));
        prop_assert_eq!(shape(&t), shape_once);
        prop_assert_eq!(t.keys().filter(|&&k| k == key).count(), 1);
    }

    #[test]
    fn prop_insert_remove_round_trip(keys in keys_strategy(), key in 0u16..1024) {
        let mut t: AvlTree<u16, ()> = keys.into_iter().map(|k| (k, ())).collect();
        prop_assume!(!t.contains_key(&key));

        let before = shape(&t);
        t.insert(key, ());
        // Ignoring the new leaf and the balances along its path, did the
        // insert leave every other node where it was?
        let after_insert: Vec<(u16, Option<u16>)> = shape(&t)
            .into_iter()
            .filter(|&(k, _, _)| k != key)
            .map(|(k, p, _)| (k, p))
            .collect();
        let no_rotation =
            after_insert == before.iter().map(|&(k, p, _)| (k, p)).collect::<Vec<_>>();

        t.remove(&key);
        validate_tree(&t);
        let after = shape(&t);
        let keys_before: Vec<u16> = before.iter().map(|&(k, _, _)| k).collect();
        let keys_after: Vec<u16> = after.iter().map(|&(k, _, _)| k).collect();
        prop_assert_eq!(keys_after, keys_before);
        if no_rotation {
            prop_assert_eq!(after, before);
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u16> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let mut t: AvlTree<u16, u64> = AvlTree::new();
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(k, v), m.insert(k, v));
            validate_tree(&t);
        }

        let got: Vec<(u16, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u64)> = m.into_iter().collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u16> = (1..=7).collect();

    // Insert in a few fixed orders, then remove in all permutations.
    for base_order in [vec![1, 2, 3, 4, 5, 6, 7], vec![4, 2, 6, 1, 3, 5, 7], vec![7, 1, 6, 2, 5, 3, 4]] {
        let mut base_tree: AvlTree<u16, u64> = AvlTree::new();
        let mut base_map: BTreeMap<u16, u64> = BTreeMap::new();
        for (i, &k) in base_order.iter().enumerate() {
            let v = i as u64;
            assert_eq!(base_tree.insert(k, v), base_map.insert(k, v));
        }

        for_each_permutation(&keys, |perm| {
            let mut t = base_tree.clone();
            let mut m = base_map.clone();

            for k in perm {
                assert_eq!(t.remove(&k), m.remove(&k));
                assert_eq!(t.len(), m.len());
                validate_tree(&t);
            }
            assert_eq!(t.len(), 0);
            assert!(t.inner().root.is_null());
        });
    }
}
