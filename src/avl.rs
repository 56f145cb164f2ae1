//! AVL tree.
//!
//! [`AvlTree`] reuses the plain tree for descent, attachment and unlinking,
//! and after every structural mutation runs an ascending fixup that restores
//! `|balance| <= 1` at every node through single and double rotations.
//!
//! Balance factors are stored as `height(right) - height(left)`, so a
//! left-leaning node is negative. [`Side::sign`] maps a side to the balance
//! change caused by growing that side.

use std::borrow::Borrow;

use log::{debug, trace, warn};

use crate::bst::{Attach, BinarySearchTree};
use crate::error::Result;
use crate::iter::{IntoIter, Iter, Keys, Values};
use crate::node::Ptr;
use crate::print::render_tree;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    fn sign(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }

    #[inline]
    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// An ordered map kept height-balanced by AVL rotations.
///
/// Insert, remove and lookup are `O(log n)`; inserting an existing key
/// replaces its value without touching the tree shape.
pub struct AvlTree<K, V> {
    tree: BinarySearchTree<K, V>,
}

impl<K, V> AvlTree<K, V> {
    pub fn new() -> Self {
        Self {
            tree: BinarySearchTree::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn memory_usage(&self) -> usize {
        self.tree.memory_usage()
    }

    pub fn shrink_to_fit(&mut self) {
        self.tree.shrink_to_fit();
    }

    /// Number of nodes on the longest root-to-leaf path.
    ///
    /// Follows the taller child at each level, so this is `O(log n)` rather
    /// than a full traversal.
    pub fn height(&self) -> usize {
        let nodes = &self.tree.nodes;
        let mut height = 0;
        let mut ptr = self.tree.root;
        while !ptr.is_null() {
            height += 1;
            ptr = if nodes.balance(ptr) < 0 {
                nodes.left(ptr)
            } else {
                nodes.right(ptr)
            };
        }
        height
    }

    /// Recomputes subtree heights from scratch and checks the AVL bound.
    /// Always true unless the stored balances have gone wrong.
    pub fn is_balanced(&self) -> bool {
        self.tree.is_balanced()
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first_key_value()
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last_key_value()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }

    /// Like [`BinarySearchTree::render`], with each node's balance factor.
    pub fn render(&self) -> String
    where
        K: std::fmt::Debug,
    {
        render_tree(&self.tree.nodes, self.tree.root, |node| {
            let b = node.balance;
            if b > 0 {
                format!("{:?} [+{b}]", node.key)
            } else {
                format!("{:?} [{b}]", node.key)
            }
        })
    }

    #[inline]
    pub(crate) fn inner(&self) -> &BinarySearchTree<K, V> {
        &self.tree
    }

    #[inline]
    fn child(&self, ptr: Ptr, side: Side) -> Ptr {
        match side {
            Side::Left => self.tree.nodes.left(ptr),
            Side::Right => self.tree.nodes.right(ptr),
        }
    }

    #[inline]
    fn side_of(&self, parent: Ptr, child: Ptr) -> Side {
        if self.tree.nodes.left(parent) == child {
            Side::Left
        } else {
            Side::Right
        }
    }

    // =========================================================================
    // Rotations
    // =========================================================================

    /// Lifts `n`'s left child into `n`'s place. Returns `false` without
    /// touching anything if there is no left child. Balances are left to the
    /// caller.
    fn rotate_right(&mut self, n: Ptr) -> bool {
        let nodes = &mut self.tree.nodes;
        let parent = nodes.parent(n);
        let left = nodes.left(n);
        if left.is_null() {
            warn!("rotate_right on a node without a left child; skipped");
            return false;
        }
        let right_of_left = nodes.right(left);

        if parent.is_null() {
            self.tree.root = left;
        } else if nodes.left(parent) == n {
            nodes.set_left(parent, left);
        } else {
            nodes.set_right(parent, left);
        }
        nodes.set_parent_opt(right_of_left, n);
        nodes.set_parent(left, parent);
        nodes.set_right(left, n);
        nodes.set_left(n, right_of_left);
        nodes.set_parent(n, left);
        trace!("rotate_right: {:?} lifted over {:?}", left, n);
        true
    }

    /// Mirror of [`rotate_right`](Self::rotate_right).
    fn rotate_left(&mut self, n: Ptr) -> bool {
        let nodes = &mut self.tree.nodes;
        let parent = nodes.parent(n);
        let right = nodes.right(n);
        if right.is_null() {
            warn!("rotate_left on a node without a right child; skipped");
            return false;
        }
        let left_of_right = nodes.left(right);

        if parent.is_null() {
            self.tree.root = right;
        } else if nodes.right(parent) == n {
            nodes.set_right(parent, right);
        } else {
            nodes.set_left(parent, right);
        }
        nodes.set_parent_opt(left_of_right, n);
        nodes.set_parent(right, parent);
        nodes.set_left(right, n);
        nodes.set_right(n, left_of_right);
        nodes.set_parent(n, right);
        trace!("rotate_left: {:?} lifted over {:?}", right, n);
        true
    }

    /// Lifts the child of `n` on `side`.
    fn lift(&mut self, n: Ptr, side: Side) {
        let rotated = match side {
            Side::Left => self.rotate_right(n),
            Side::Right => self.rotate_left(n),
        };
        debug_assert!(rotated, "fixup rotated {n:?} toward a missing child");
    }

    /// Trades tree positions and balance factors of `x` and `y`, so the
    /// balance stays with the position while the entry moves.
    fn node_swap(&mut self, x: Ptr, y: Ptr) {
        self.tree.node_swap(x, y);
        let nodes = &mut self.tree.nodes;
        let bx = nodes.balance(x);
        nodes.set_balance(x, nodes.balance(y));
        nodes.set_balance(y, bx);
    }

    // =========================================================================
    // Fixups
    // =========================================================================

    /// Runs after `p`'s subtree grew by one level because of its child `n`,
    /// with `p`'s balance already updated. Walks up until the growth is
    /// absorbed or fixed by a rotation.
    fn insert_fixup(&mut self, mut p: Ptr, mut n: Ptr) {
        loop {
            let g = self.tree.nodes.parent(p);
            if g.is_null() {
                return;
            }
            let side = self.side_of(g, p);
            let s = side.sign();
            self.tree.nodes.update_balance(g, s);
            let gb = self.tree.nodes.balance(g);

            if gb == 0 {
                return;
            }
            if gb == s {
                n = p;
                p = g;
                continue;
            }

            if self.child(p, side) == n {
                // Zig-zig.
                self.lift(g, side);
                let nodes = &mut self.tree.nodes;
                nodes.set_balance(p, 0);
                nodes.set_balance(g, 0);
                debug!("insert_fixup: single rotation at {g:?} ({side:?}-heavy)");
            } else {
                // Zig-zag.
                let nb = self.tree.nodes.balance(n);
                self.lift(p, side.opposite());
                self.lift(g, side);
                let nodes = &mut self.tree.nodes;
                nodes.set_balance(p, if nb == -s { -nb } else { 0 });
                nodes.set_balance(g, if nb == s { -nb } else { 0 });
                nodes.set_balance(n, 0);
                debug!("insert_fixup: double rotation at {g:?} ({side:?}-heavy, pivot balance {nb})");
            }
            return;
        }
    }

    /// Runs after the subtree on one side of `n` shrank by one level. `diff`
    /// is the balance change at `n`: `+1` when its left side shrank, `-1` for
    /// the right.
    ///
    /// Unlike insertion, a rotation does not always end the walk: the
    /// rotated subtree is one level shorter except when the lifted child was
    /// balanced.
    fn remove_fixup(&mut self, mut n: Ptr, mut diff: i8) {
        while !n.is_null() {
            let p = self.tree.nodes.parent(n);
            let ndiff = if !p.is_null() && self.tree.nodes.left(p) == n {
                1
            } else {
                -1
            };
            let effective = self.tree.nodes.balance(n) + diff;

            match effective {
                -2 | 2 => {
                    let heavy = if effective < 0 { Side::Left } else { Side::Right };
                    let s = heavy.sign();
                    let c = self.child(n, heavy);
                    let cb = self.tree.nodes.balance(c);

                    if cb == s {
                        // Zig-zig, child leaning the same way.
                        self.lift(n, heavy);
                        let nodes = &mut self.tree.nodes;
                        nodes.set_balance(n, 0);
                        nodes.set_balance(c, 0);
                        debug!("remove_fixup: single rotation at {n:?} ({heavy:?}-heavy)");
                    } else if cb == 0 {
                        // Zig-zig, balanced child: height is unchanged above.
                        self.lift(n, heavy);
                        let nodes = &mut self.tree.nodes;
                        nodes.set_balance(n, s);
                        nodes.set_balance(c, -s);
                        debug!("remove_fixup: single rotation at {n:?} absorbed the shrink");
                        return;
                    } else {
                        // Zig-zag.
                        let g = self.child(c, heavy.opposite());
                        let gb = self.tree.nodes.balance(g);
                        self.lift(c, heavy.opposite());
                        self.lift(n, heavy);
                        let nodes = &mut self.tree.nodes;
                        nodes.set_balance(n, if gb == s { -s } else { 0 });
                        nodes.set_balance(c, if gb == -s { s } else { 0 });
                        nodes.set_balance(g, 0);
                        debug!("remove_fixup: double rotation at {n:?} ({heavy:?}-heavy, pivot balance {gb})");
                    }
                }
                -1 | 1 => {
                    self.tree.nodes.set_balance(n, effective);
                    return;
                }
                _ => {
                    debug_assert_eq!(effective, 0);
                    self.tree.nodes.set_balance(n, 0);
                }
            }

            n = p;
            diff = ndiff;
        }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// Keyed access for callers that require the key to be present; a missing
    /// key is [`Error::KeyNotFound`](crate::Error::KeyNotFound).
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.try_get(key)
    }

    pub fn try_get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.try_get_mut(key)
    }

    /// Inserts `key`, returning the value it replaced. Replacing a value never
    /// rebalances.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let n = match self.tree.attach(key, value) {
            Attach::Replaced(old) => return Some(old),
            Attach::Inserted(n) => n,
        };

        let p = self.tree.nodes.parent(n);
        if p.is_null() {
            return None;
        }
        if self.tree.nodes.balance(p) != 0 {
            // The new leaf filled p's only empty side.
            self.tree.nodes.set_balance(p, 0);
        } else {
            let side = self.side_of(p, n);
            self.tree.nodes.update_balance(p, side.sign());
            self.insert_fixup(p, n);
        }
        None
    }

    /// Removes `key`, returning its value. Removing an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let t = self.tree.find_node(key);
        if t.is_null() {
            return None;
        }

        let nodes = &self.tree.nodes;
        if !nodes.left(t).is_null() && !nodes.right(t).is_null() {
            let pred = nodes.predecessor(t);
            self.node_swap(t, pred);
        }
        let (parent, diff) = self.tree.detach(t);
        let node = self.tree.release(t);
        self.remove_fixup(parent, diff);
        Some(node.value)
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for AvlTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTree<K, V> {}

impl<K, Q, V> std::ops::Index<&Q> for AvlTree<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.try_get(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> IntoIterator for AvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        self.tree.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
