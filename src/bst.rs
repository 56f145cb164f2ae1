//! Unbalanced binary search tree.
//!
//! [`BinarySearchTree`] is a usable ordered map on its own, and it is the
//! structural substrate of [`AvlTree`](crate::AvlTree): descent, leaf
//! attachment, predecessor lookup, unlinking and the structural node swap all
//! live here, while the AVL layer only adds balance bookkeeping and rotations.

use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::iter::{IntoIter, Iter, Keys, Values};
use crate::node::{Node, NodeArena, Ptr};
use crate::print::render_tree;

/// Result of attaching a key to the tree.
pub(crate) enum Attach<V> {
    /// The key was present; its value was replaced and the old one is returned.
    Replaced(V),
    /// A new leaf was linked in.
    Inserted(Ptr),
}

/// An ordered map with no rebalancing.
///
/// Keys inserted in sorted order degenerate into a linked list, which is
/// exactly what [`is_balanced`](Self::is_balanced) reports.
pub struct BinarySearchTree<K, V> {
    pub(crate) nodes: NodeArena<K, V>,
    pub(crate) root: Ptr,
    pub(crate) count: usize,
}

impl<K, V> BinarySearchTree<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            root: Ptr::NULL,
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = Ptr::NULL;
        self.count = 0;
    }

    /// Bytes held by the node arena, including released slots.
    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Option<Node<K, V>>>()
    }

    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        if self.root.is_null() {
            return 0;
        }
        self.subtree_heights()[self.root.idx()]
    }

    /// Whether the left and right subtree heights of every node differ by at
    /// most one.
    pub fn is_balanced(&self) -> bool {
        let heights = self.subtree_heights();
        let h = |ptr: Ptr| if ptr.is_null() { 0 } else { heights[ptr.idx()] };
        self.preorder()
            .into_iter()
            .all(|ptr| h(self.nodes.left(ptr)).abs_diff(h(self.nodes.right(ptr))) <= 1)
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let ptr = self.nodes.min_node(self.root);
        (!ptr.is_null()).then(|| {
            let node = &self.nodes[ptr];
            (&node.key, &node.value)
        })
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let ptr = self.nodes.max_node(self.root);
        (!ptr.is_null()).then(|| {
            let node = &self.nodes[ptr];
            (&node.key, &node.value)
        })
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root, self.count)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Box-drawing dump of the tree shape, one key per line.
    pub fn render(&self) -> String
    where
        K: std::fmt::Debug,
    {
        render_tree(&self.nodes, self.root, |node| format!("{:?}", node.key))
    }

    // =========================================================================
    // Structural primitives
    // =========================================================================

    /// Live nodes reachable from the root, parents before children.
    pub(crate) fn preorder(&self) -> Vec<Ptr> {
        let mut out = Vec::with_capacity(self.count);
        let mut stack = Vec::new();
        if !self.root.is_null() {
            stack.push(self.root);
        }
        while let Some(ptr) = stack.pop() {
            out.push(ptr);
            let node = &self.nodes[ptr];
            if !node.right.is_null() {
                stack.push(node.right);
            }
            if !node.left.is_null() {
                stack.push(node.left);
            }
        }
        out
    }

    /// Height of every reachable node, indexed by slot. Iterative so a
    /// degenerate tree cannot exhaust the call stack.
    pub(crate) fn subtree_heights(&self) -> Vec<usize> {
        let mut heights = vec![0usize; self.nodes.capacity()];
        for ptr in self.preorder().into_iter().rev() {
            let node = &self.nodes[ptr];
            let l = if node.left.is_null() { 0 } else { heights[node.left.idx()] };
            let r = if node.right.is_null() { 0 } else { heights[node.right.idx()] };
            heights[ptr.idx()] = 1 + l.max(r);
        }
        heights
    }

    /// Swaps the tree positions of `x` and `y`. Keys, values and balances stay
    /// with their nodes; only the links around them move.
    pub(crate) fn node_swap(&mut self, x: Ptr, y: Ptr) {
        if x == y {
            return;
        }
        let nodes = &mut self.nodes;

        let (xp, xl, xr) = (nodes.parent(x), nodes.left(x), nodes.right(x));
        let (yp, yl, yr) = (nodes.parent(y), nodes.left(y), nodes.right(y));
        // Sides are read up front: when x and y are siblings, relinking one of
        // them rewrites the shared parent before the other is looked at.
        let x_is_left = !xp.is_null() && nodes.left(xp) == x;
        let y_is_left = !yp.is_null() && nodes.left(yp) == y;

        // x takes over y's children.
        if yl == x {
            nodes.set_left(x, y);
            nodes.set_parent(y, x);
        } else {
            nodes.set_left(x, yl);
            nodes.set_parent_opt(yl, x);
        }
        if yr == x {
            nodes.set_right(x, y);
            nodes.set_parent(y, x);
        } else {
            nodes.set_right(x, yr);
            nodes.set_parent_opt(yr, x);
        }

        // y takes over x's children.
        if xl == y {
            nodes.set_left(y, x);
            nodes.set_parent(x, y);
        } else {
            nodes.set_left(y, xl);
            nodes.set_parent_opt(xl, y);
        }
        if xr == y {
            nodes.set_right(y, x);
            nodes.set_parent(x, y);
        } else {
            nodes.set_right(y, xr);
            nodes.set_parent_opt(xr, y);
        }

        // Parents.
        if xp.is_null() {
            self.root = y;
            nodes.set_parent(y, Ptr::NULL);
        } else if xp != y {
            nodes.set_parent(y, xp);
            if x_is_left {
                nodes.set_left(xp, y);
            } else {
                nodes.set_right(xp, y);
            }
        }
        if yp.is_null() {
            self.root = x;
            nodes.set_parent(x, Ptr::NULL);
        } else if yp != x {
            nodes.set_parent(x, yp);
            if y_is_left {
                nodes.set_left(yp, x);
            } else {
                nodes.set_right(yp, x);
            }
        }
    }

    /// Unlinks `t`, which must have at most one child, promoting that child
    /// into its place. Returns `t`'s former parent and the balance correction
    /// for it: `+1` if `t` hung on the left, `-1` on the right, `0` for the
    /// root.
    pub(crate) fn detach(&mut self, t: Ptr) -> (Ptr, i8) {
        let nodes = &mut self.nodes;
        debug_assert!(
            nodes.left(t).is_null() || nodes.right(t).is_null(),
            "detach target must have at most one child"
        );
        let child = if nodes.left(t).is_null() {
            nodes.right(t)
        } else {
            nodes.left(t)
        };
        let parent = nodes.parent(t);
        nodes.set_parent_opt(child, parent);

        if parent.is_null() {
            self.root = child;
            (parent, 0)
        } else if nodes.left(parent) == t {
            nodes.set_left(parent, child);
            (parent, 1)
        } else {
            nodes.set_right(parent, child);
            (parent, -1)
        }
    }

    /// Releases an already-unlinked node.
    pub(crate) fn release(&mut self, t: Ptr) -> Node<K, V> {
        self.count -= 1;
        self.nodes.free(t)
    }
}

impl<K: Ord, V> BinarySearchTree<K, V> {
    /// Handle of the node holding `key`, or `Ptr::NULL`.
    pub(crate) fn find_node<Q>(&self, key: &Q) -> Ptr
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while !current.is_null() {
            let node = &self.nodes[current];
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return current,
            };
        }
        Ptr::NULL
    }

    /// Descends to `key`; overwrites the value of an existing node, otherwise
    /// links a new leaf with balance 0.
    pub(crate) fn attach(&mut self, key: K, value: V) -> Attach<V> {
        if self.root.is_null() {
            self.root = self.nodes.alloc(key, value, Ptr::NULL);
            self.count += 1;
            return Attach::Inserted(self.root);
        }

        let mut parent = self.root;
        let go_left = loop {
            let node = &mut self.nodes[parent];
            let ord = key.cmp(&node.key);
            let next = match ord {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => {
                    return Attach::Replaced(std::mem::replace(&mut node.value, value));
                }
            };
            if next.is_null() {
                break ord == Ordering::Less;
            }
            parent = next;
        };

        let leaf = self.nodes.alloc(key, value, parent);
        if go_left {
            self.nodes.set_left(parent, leaf);
        } else {
            self.nodes.set_right(parent, leaf);
        }
        self.count += 1;
        Attach::Inserted(leaf)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.find_node(key);
        (!ptr.is_null()).then(|| &self.nodes[ptr].value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.find_node(key);
        if ptr.is_null() {
            return None;
        }
        Some(&mut self.nodes[ptr].value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find_node(key).is_null()
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    pub fn try_get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Inserts without rebalancing. Returns the previous value of `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.attach(key, value) {
            Attach::Replaced(old) => Some(old),
            Attach::Inserted(_) => None,
        }
    }

    /// Removes without rebalancing. A node with two children first trades
    /// places with its in-order predecessor.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let t = self.find_node(key);
        if t.is_null() {
            return None;
        }
        if !self.nodes.left(t).is_null() && !self.nodes.right(t).is_null() {
            let pred = self.nodes.predecessor(t);
            self.node_swap(t, pred);
        }
        self.detach(t);
        Some(self.release(t).value)
    }
}

impl<K, V> Default for BinarySearchTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for BinarySearchTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            count: self.count,
        }
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for BinarySearchTree<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BinarySearchTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        for (k, v) in iter {
            tree.insert(k, v);
        }
        tree
    }
}

impl<K, V> IntoIterator for BinarySearchTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.nodes, self.root)
    }
}

impl<'a, K, V> IntoIterator for &'a BinarySearchTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
