//! # avl-rs
//!
//! An ordered map backed by an AVL tree whose nodes live in an arena.
//!
//! Every insert and remove runs an ascending fixup that keeps the height of
//! the two subtrees of each node within one of each other, so lookups,
//! inserts and removals stay `O(log n)` whatever the insertion order.
//!
//! ## Example
//!
//! ```rust
//! use avl_rs::AvlTree;
//!
//! let mut tree: AvlTree<u32, &str> = AvlTree::new();
//! for k in 1..=7 {
//!     tree.insert(k, "v");
//! }
//! assert_eq!(tree.height(), 3);
//!
//! assert_eq!(tree.insert(4, "four"), Some("v"));
//! assert_eq!(tree.get(&4), Some(&"four"));
//! assert_eq!(tree.remove(&4), Some("four"));
//! assert_eq!(tree.remove(&4), None);
//!
//! let keys: Vec<u32> = tree.keys().copied().collect();
//! assert_eq!(keys, [1, 2, 3, 5, 6, 7]);
//! ```
//!
//! [`BinarySearchTree`] is the same map without rebalancing, and
//! [`equal_paths`] checks leaf depths of a plain owned binary tree.

#![forbid(unsafe_code)]

mod avl;
mod bst;
pub mod equal_paths;
mod error;
mod iter;
mod node;
mod print;

pub use avl::AvlTree;
pub use bst::BinarySearchTree;
pub use equal_paths::{equal_paths, BinaryNode};
pub use error::{Error, Result};
pub use iter::{IntoIter, Iter, Keys, Values};

// =============================================================================
// Configuration
// =============================================================================

/// Arena index reserved for "no node".
const NULL_INDEX: u32 = u32::MAX;

/// Worst-case height of an AVL tree relative to a perfectly balanced one.
const MAX_HEIGHT_FACTOR: f64 = 1.44;

/// Upper bound on the height of an AVL tree holding `len` entries:
/// `ceil(1.44 * log2(len + 1))`.
pub fn height_bound(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (MAX_HEIGHT_FACTOR * ((len as f64) + 1.0).log2()).ceil() as usize
}


#[cfg(test)]
mod proptests;
