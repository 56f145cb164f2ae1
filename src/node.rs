//! Node storage.
//!
//! Nodes live in a slot arena and refer to each other through [`Ptr`]
//! handles. A node's children are reached only through its `left`/`right`
//! links and each live slot is linked from exactly one parent (or from the
//! tree root), so ownership stays a tree even though the back-links are plain
//! handles as well.

use crate::NULL_INDEX;

// =============================================================================
// Pointer type
// =============================================================================

/// Handle to a node slot.
///
/// - `Ptr::NULL` (all bits set) stands for an absent node.
/// - Any other value is an index into the owning [`NodeArena`].
///
/// Handles stay valid while the node is live; a freed slot may be handed out
/// again by a later allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Ptr(u32);

impl Ptr {
    pub(crate) const NULL: Ptr = Ptr(NULL_INDEX);

    #[inline]
    fn from_index(idx: usize) -> Self {
        debug_assert!(idx < NULL_INDEX as usize, "arena index overflow");
        Self(idx as u32)
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self.0 == NULL_INDEX
    }

    #[inline]
    pub(crate) fn idx(self) -> usize {
        debug_assert!(!self.is_null());
        self.0 as usize
    }
}

impl std::fmt::Debug for Ptr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            f.write_str("Ptr(NULL)")
        } else {
            write!(f, "Ptr({})", self.0)
        }
    }
}

// =============================================================================
// Node
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// `height(right) - height(left)`. Always 0 in a plain tree; `-2..=2`
    /// while an AVL fixup is running and `-1..=1` otherwise.
    pub(crate) balance: i8,
    pub(crate) parent: Ptr,
    pub(crate) left: Ptr,
    pub(crate) right: Ptr,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, parent: Ptr) -> Self {
        Self {
            key,
            value,
            balance: 0,
            parent,
            left: Ptr::NULL,
            right: Ptr::NULL,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_null() && self.right.is_null()
    }
}

// =============================================================================
// Node Arena
// =============================================================================

/// Slot arena with a free list of released indices.
#[derive(Clone)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<u32>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of slots, live or free.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn alloc(&mut self, key: K, value: V, parent: Ptr) -> Ptr {
        let node = Node::new(key, value, parent);
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            debug_assert!(slot.is_none(), "free list points at a live slot");
            *slot = Some(node);
            return Ptr(idx);
        }
        let ptr = Ptr::from_index(self.slots.len());
        self.slots.push(Some(node));
        ptr
    }

    /// Releases the slot and hands back its node. The caller must already have
    /// unlinked it from the tree.
    pub(crate) fn free(&mut self, ptr: Ptr) -> Node<K, V> {
        let node = self.slots[ptr.idx()]
            .take()
            .expect("freed node handle must be live");
        self.free.push(ptr.0);
        node
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        while let Some(None) = self.slots.last() {
            self.slots.pop();
        }
        let len = self.slots.len() as u32;
        self.free.retain(|&idx| idx < len);
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    // === Link accessors ===

    #[inline]
    pub(crate) fn parent(&self, ptr: Ptr) -> Ptr {
        self[ptr].parent
    }

    #[inline]
    pub(crate) fn left(&self, ptr: Ptr) -> Ptr {
        self[ptr].left
    }

    #[inline]
    pub(crate) fn right(&self, ptr: Ptr) -> Ptr {
        self[ptr].right
    }

    #[inline]
    pub(crate) fn balance(&self, ptr: Ptr) -> i8 {
        self[ptr].balance
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, ptr: Ptr, parent: Ptr) {
        self[ptr].parent = parent;
    }

    #[inline]
    pub(crate) fn set_left(&mut self, ptr: Ptr, left: Ptr) {
        self[ptr].left = left;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, ptr: Ptr, right: Ptr) {
        self[ptr].right = right;
    }

    #[inline]
    pub(crate) fn set_balance(&mut self, ptr: Ptr, balance: i8) {
        self[ptr].balance = balance;
    }

    #[inline]
    pub(crate) fn update_balance(&mut self, ptr: Ptr, diff: i8) {
        self[ptr].balance += diff;
    }

    /// Re-parents `child` if it exists.
    #[inline]
    pub(crate) fn set_parent_opt(&mut self, child: Ptr, parent: Ptr) {
        if !child.is_null() {
            self.set_parent(child, parent);
        }
    }
}

// =============================================================================
// Traversal
// =============================================================================

impl<K, V> NodeArena<K, V> {
    /// Leftmost node of the subtree rooted at `ptr`.
    pub(crate) fn min_node(&self, mut ptr: Ptr) -> Ptr {
        if ptr.is_null() {
            return ptr;
        }
        while !self.left(ptr).is_null() {
            ptr = self.left(ptr);
        }
        ptr
    }

    /// Rightmost node of the subtree rooted at `ptr`.
    pub(crate) fn max_node(&self, mut ptr: Ptr) -> Ptr {
        if ptr.is_null() {
            return ptr;
        }
        while !self.right(ptr).is_null() {
            ptr = self.right(ptr);
        }
        ptr
    }

    /// In-order previous node, or `Ptr::NULL` for the minimum.
    pub(crate) fn predecessor(&self, ptr: Ptr) -> Ptr {
        let left = self.left(ptr);
        if !left.is_null() {
            return self.max_node(left);
        }
        let mut cur = ptr;
        let mut parent = self.parent(cur);
        while !parent.is_null() && self.left(parent) == cur {
            cur = parent;
            parent = self.parent(cur);
        }
        parent
    }

    /// In-order next node, or `Ptr::NULL` for the maximum.
    pub(crate) fn successor(&self, ptr: Ptr) -> Ptr {
        let right = self.right(ptr);
        if !right.is_null() {
            return self.min_node(right);
        }
        let mut cur = ptr;
        let mut parent = self.parent(cur);
        while !parent.is_null() && self.right(parent) == cur {
            cur = parent;
            parent = self.parent(cur);
        }
        parent
    }
}

impl<K, V> std::ops::Index<Ptr> for NodeArena<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, ptr: Ptr) -> &Node<K, V> {
        self.slots[ptr.idx()]
            .as_ref()
            .expect("node handle must be live")
    }
}

impl<K, V> std::ops::IndexMut<Ptr> for NodeArena<K, V> {
    #[inline]
    fn index_mut(&mut self, ptr: Ptr) -> &mut Node<K, V> {
        self.slots[ptr.idx()]
            .as_mut()
            .expect("node handle must be live")
    }
}
