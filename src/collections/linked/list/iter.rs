use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::{Link, NodeRef};

/// Walks a chain from a starting node toward the tail, yielding each node.
///
/// The successor is read before a node is yielded, so the yielded node may be unlinked and freed
/// without upsetting the walk. The borrow ties the walk to the lock guard it was created under.
pub(crate) struct Nodes<'a, T> {
    pub(crate) curr: Link<T>,
    pub(crate) _phantom: PhantomData<&'a T>,
}

impl<T> Nodes<'_, T> {
    pub const fn new(start: Link<T>) -> Self {
        Nodes {
            curr: start,
            _phantom: PhantomData,
        }
    }
}

impl<T> Iterator for Nodes<'_, T> {
    type Item = NodeRef<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.curr.map(|ptr| {
            self.curr = *ptr.next();
            ptr
        })
    }
}

impl<T> FusedIterator for Nodes<'_, T> {}
