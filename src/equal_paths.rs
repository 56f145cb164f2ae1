//! Leaf-depth check for plain binary trees.

/// A node of an owned, unordered binary tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryNode<T> {
    pub value: T,
    pub left: Option<Box<BinaryNode<T>>>,
    pub right: Option<Box<BinaryNode<T>>>,
}

impl<T> BinaryNode<T> {
    pub fn leaf(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    pub fn new(value: T, left: Option<BinaryNode<T>>, right: Option<BinaryNode<T>>) -> Self {
        Self {
            value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Returns `true` if every root-to-leaf path has the same number of nodes.
/// An empty tree trivially qualifies.
pub fn equal_paths<T>(root: Option<&BinaryNode<T>>) -> bool {
    root.map_or(true, |node| leaf_depth(node).is_some())
}

/// Common depth of all leaves under `node`, or `None` if they differ.
fn leaf_depth<T>(node: &BinaryNode<T>) -> Option<usize> {
    match (node.left.as_deref(), node.right.as_deref()) {
        (None, None) => Some(1),
        (Some(child), None) | (None, Some(child)) => leaf_depth(child).map(|d| d + 1),
        (Some(l), Some(r)) => {
            let dl = leaf_depth(l)?;
            let dr = leaf_depth(r)?;
            (dl == dr).then_some(dl + 1)
        }
    }
}
