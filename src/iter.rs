//! In-order iterators shared by both tree types.

use std::iter::FusedIterator;

use crate::node::{NodeArena, Ptr};

/// Borrowing in-order iterator over `(&K, &V)`.
///
/// Walks parent links instead of keeping a stack, so it needs no allocation.
pub struct Iter<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    front: Ptr,
    back: Ptr,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(nodes: &'a NodeArena<K, V>, root: Ptr, len: usize) -> Self {
        Self {
            nodes,
            front: nodes.min_node(root),
            back: nodes.max_node(root),
            remaining: len,
        }
    }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.front];
        self.remaining -= 1;
        self.front = self.nodes.successor(self.front);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.back];
        self.remaining -= 1;
        self.back = self.nodes.predecessor(self.back);
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Owning in-order iterator.
///
/// The visiting order is fixed up front: releasing a node breaks the parent
/// walk that `successor` relies on.
pub struct IntoIter<K, V> {
    nodes: NodeArena<K, V>,
    order: std::vec::IntoIter<Ptr>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(nodes: NodeArena<K, V>, root: Ptr) -> Self {
        let mut order = Vec::new();
        let mut ptr = nodes.min_node(root);
        while !ptr.is_null() {
            order.push(ptr);
            ptr = nodes.successor(ptr);
        }
        Self {
            nodes,
            order: order.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let ptr = self.order.next()?;
        let node = self.nodes.free(ptr);
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        let ptr = self.order.next_back()?;
        let node = self.nodes.free(ptr);
        Some((node.key, node.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
