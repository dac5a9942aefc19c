use derive_more::IsVariant;

use super::{Destructors, Entry, Length, Link, NodeRef, Nodes, ONE};
use crate::util::error::CapacityOverflow;
use crate::util::option::OptionExtension;
use crate::util::result::ResultExtension;

/// Everything guarded by a list's lock: the chain of entries and the iteration cursor.
pub(crate) struct Chain<T> {
    pub state: ListState<T>,
    /// The next entry to be yielded by the cursor. Never counted as an owner.
    pub cursor: Link<T>,
}

// SAFETY: A Chain exclusively owns every node reachable from it, so sending it sends the payloads
// along with it.
unsafe impl<T: Send> Send for Chain<T> {}

#[derive(IsVariant)]
pub(crate) enum ListState<T> {
    Empty,
    Full(ListContents<T>),
}

use ListState::*;

/// The ends of a non-empty chain. `head` owns the chain transitively through each node's `next`
/// link, `tail` and every `prev` link are back references only.
pub(crate) struct ListContents<T> {
    pub len: Length,
    pub head: NodeRef<T>,
    pub tail: NodeRef<T>,
}

/// Which side of an anchor a new node is linked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    /// Grows toward the head. Without an anchor, the node becomes the new head.
    Before,
    /// Grows toward the tail. Without an anchor, the node becomes the new tail.
    After,
}

impl<T> Chain<T> {
    pub const fn new() -> Chain<T> {
        Chain {
            state: Empty,
            cursor: None,
        }
    }

    /// Detaches `node` from the chain, moving the cursor past it if it pointed there. The payload
    /// isn't touched.
    pub fn unlink(&mut self, node: NodeRef<T>) {
        if self.cursor == Some(node) {
            self.cursor = *node.next();
        }
        self.state.unlink(node);
    }

    /// Unlinks `node` and destroys its payload, preferring `overriding` over the list's default
    /// destructor.
    pub fn remove(
        &mut self,
        node: NodeRef<T>,
        destructors: &Destructors<T>,
        overriding: Option<&dyn Fn(T)>,
    ) {
        self.unlink(node);
        destructors.dispose(node.take_node().entry.into_value(), overriding);
    }

    /// Unlinks `node` and hands its entry back to the caller without destroying anything.
    pub fn take(&mut self, node: NodeRef<T>) -> Entry<T> {
        self.unlink(node);
        node.take_node().entry
    }
}

impl<T> ListState<T> {
    pub const fn len(&self) -> usize {
        match self {
            Empty => 0,
            Full(ListContents { len, .. }) => len.get(),
        }
    }

    pub const fn head(&self) -> Link<T> {
        match self {
            Empty => None,
            Full(ListContents { head, .. }) => Some(*head),
        }
    }

    pub const fn tail(&self) -> Link<T> {
        match self {
            Empty => None,
            Full(ListContents { tail, .. }) => Some(*tail),
        }
    }

    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes::new(self.head())
    }

    /// Links the detached `node` immediately before or after `anchor`. Without an anchor, the node
    /// is linked at the head (for [`Side::Before`]) or the tail (for [`Side::After`]).
    ///
    /// On an empty chain, the anchor must be `None` and the node becomes both head and tail.
    pub fn insert_at(&mut self, node: NodeRef<T>, anchor: Link<T>, side: Side) {
        debug_assert!(node.prev().is_none() && node.next().is_none());

        match self {
            Empty => {
                debug_assert!(anchor.is_none(), "anchor given for an empty chain");
                *self = Full(ListContents {
                    len: ONE,
                    head: node,
                    tail: node,
                });
            },
            Full(contents) => {
                contents.len = contents.len.checked_add(1).ok_or(CapacityOverflow).throw();

                match side {
                    Side::After => {
                        let anchor = anchor.unwrap_or(contents.tail);
                        *node.prev_mut() = Some(anchor);
                        *node.next_mut() = *anchor.next();
                        match *anchor.next() {
                            Some(next) => *next.prev_mut() = Some(node),
                            None => contents.tail = node,
                        }
                        *anchor.next_mut() = Some(node);
                    },
                    Side::Before => {
                        let anchor = anchor.unwrap_or(contents.head);
                        *node.next_mut() = Some(anchor);
                        *node.prev_mut() = *anchor.prev();
                        match *anchor.prev() {
                            Some(prev) => *prev.next_mut() = Some(node),
                            None => contents.head = node,
                        }
                        *anchor.prev_mut() = Some(node);
                    },
                }
            },
        }

        self.debug_check_ends();
    }

    /// Detaches `node`, repairing its neighbours' links and the ends of the chain. The node's own
    /// links are cleared and its entry is left as is.
    pub fn unlink(&mut self, node: NodeRef<T>) {
        match self {
            Empty => debug_assert!(false, "unlink called on an empty chain"),
            Full(contents) => match contents.len.checked_sub(1) {
                None => {
                    debug_assert!(contents.head == node && contents.tail == node);
                    *self = Empty;
                },
                Some(new_len) => {
                    let (prev, next) = (*node.prev(), *node.next());

                    match next {
                        Some(next) => *next.prev_mut() = prev,
                        None => {
                            debug_assert!(contents.tail == node);
                            // SAFETY: A chain longer than one has a node before its tail.
                            contents.tail = unsafe { prev.unreachable() };
                        },
                    }
                    match prev {
                        Some(prev) => *prev.next_mut() = next,
                        None => {
                            debug_assert!(contents.head == node);
                            // SAFETY: A chain longer than one has a node after its head.
                            contents.head = unsafe { next.unreachable() };
                        },
                    }

                    contents.len = new_len;
                },
            },
        }

        *node.prev_mut() = None;
        *node.next_mut() = None;
        self.debug_check_ends();
    }

    /// Finds the node at `index`, counting from the head. Returns `None` if `index` is out of
    /// bounds.
    pub fn find_by_index(&self, index: usize) -> Link<T> {
        match self {
            Full(contents) if index < contents.len.get() => Some(contents.seek(index)),
            _ => None,
        }
    }

    /// Finds the node at `index`, where negative indices count back from the tail: `-1` is the
    /// last node and `-len` the first.
    // Not exposed publicly, get/remove only take absolute indices.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn find_by_relative_index(&self, index: isize) -> Link<T> {
        let index = if index < 0 {
            index.checked_add_unsigned(self.len())?
        } else {
            index
        };
        usize::try_from(index).ok().and_then(|index| self.find_by_index(index))
    }

    fn debug_check_ends(&self) {
        if let Full(ListContents { head, tail, .. }) = self {
            debug_assert!(head.prev().is_none(), "head has a previous node");
            debug_assert!(tail.next().is_none(), "tail has a next node");
        }
    }

    /// Walks the whole chain in both directions, panicking if any link, either end or the length
    /// is inconsistent.
    ///
    /// # Panics
    /// Panics if the chain is corrupt.
    #[allow(clippy::unwrap_used)]
    pub fn verify_links(&self) {
        match self {
            Empty => {},
            Full(ListContents { len, head, tail }) => {
                assert!(head.prev().is_none(), "head has a previous node");
                assert!(tail.next().is_none(), "tail has a next node");

                let mut count = 1;
                let mut curr = *head;
                while let Some(next) = curr.next() {
                    // UNWRAP: This needs to panic if prev is None.
                    assert!(next.prev().unwrap() == curr, "broken back link");
                    curr = *next;
                    count += 1;
                }
                assert!(*tail == curr, "forward walk didn't end at the tail");
                assert_eq!(count, len.get(), "length doesn't match the chain");

                let mut count = 1;
                let mut curr = *tail;
                while let Some(prev) = curr.prev() {
                    curr = *prev;
                    count += 1;
                }
                assert!(*head == curr, "backward walk didn't end at the head");
                assert_eq!(count, len.get(), "backward walk length doesn't match");
            },
        }
    }
}

impl<T> ListContents<T> {
    pub fn seek(&self, index: usize) -> NodeRef<T> {
        if index < self.len.get() / 2 {
            self.seek_fwd(index, self.head)
        } else {
            self.seek_bwd(self.last_index() - index, self.tail)
        }
    }

    pub fn seek_fwd(&self, count: usize, mut node: NodeRef<T>) -> NodeRef<T> {
        for _ in 0..count {
            // SAFETY: Callers never seek past the end of the chain.
            node = unsafe { node.next().unreachable() };
        }
        node
    }

    pub fn seek_bwd(&self, count: usize, mut node: NodeRef<T>) -> NodeRef<T> {
        for _ in 0..count {
            // SAFETY: Callers never seek past the start of the chain.
            node = unsafe { node.prev().unreachable() };
        }
        node
    }

    pub const fn last_index(&self) -> usize {
        self.len.get() - 1
    }
}
