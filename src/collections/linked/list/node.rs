use std::alloc::{self, Layout};
use std::fmt::{self, Debug, Formatter};
use std::ptr::NonNull;

pub(crate) type Link<T> = Option<NodeRef<T>>;

// NOTE: Nodes are allocated through the global allocator directly, rather than with Box::new, so
// that an allocation failure can be reported to the caller instead of aborting. The layout used is
// exactly that of Box<Node<T>>, so nodes are still freed by moving them back into a Box.

/// A payload stored in a [`LockedList`](super::LockedList), along with its length in bytes.
///
/// Entries are handed out by reference through [`EntryGuard`](super::EntryGuard)s, or by value
/// when ownership of the payload is transferred out of the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry<T> {
    value: T,
    byte_len: usize,
}

impl<T> Entry<T> {
    pub(crate) const fn new(value: T, byte_len: usize) -> Entry<T> {
        Entry { value, byte_len }
    }

    /// Returns a reference to the payload.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Returns a mutable reference to the payload.
    pub const fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Returns the byte length recorded for the payload when it was inserted.
    pub const fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Consumes the Entry, returning the payload.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Consumes the Entry, returning the payload and its byte length.
    pub fn into_parts(self) -> (T, usize) {
        (self.value, self.byte_len)
    }
}

pub(crate) struct NodeRef<T>(pub NonNull<Node<T>>);

impl<T> NodeRef<T> {
    pub const fn entry<'a>(&self) -> &'a Entry<T> {
        // SAFETY: A NodeRef is only created for a live node, which isn't freed while it is still
        // linked into a chain. Callers hold the list's lock for the lifetime they pick here.
        unsafe { &(*self.0.as_ptr()).entry }
    }

    pub const fn entry_mut<'a>(&mut self) -> &'a mut Entry<T> {
        // SAFETY: As above, and the list's lock gives the caller exclusive access.
        unsafe { &mut (*self.0.as_ptr()).entry }
    }

    pub const fn prev<'a>(&self) -> &'a Link<T> {
        // SAFETY: The node is live, see NodeRef::entry.
        unsafe { &(*self.0.as_ptr()).prev }
    }

    #[allow(clippy::mut_from_ref)]
    pub const fn prev_mut<'a>(&self) -> &'a mut Link<T> {
        // SAFETY: The node is live and links are only written while the list is locked.
        unsafe { &mut (*self.0.as_ptr()).prev }
    }

    pub const fn next<'a>(&self) -> &'a Link<T> {
        // SAFETY: The node is live, see NodeRef::entry.
        unsafe { &(*self.0.as_ptr()).next }
    }

    #[allow(clippy::mut_from_ref)]
    pub const fn next_mut<'a>(&self) -> &'a mut Link<T> {
        // SAFETY: The node is live and links are only written while the list is locked.
        unsafe { &mut (*self.0.as_ptr()).next }
    }

    /// Moves `node` onto the heap, returning it back to the caller if the allocation fails.
    pub fn try_from_node(node: Node<T>) -> Result<NodeRef<T>, Node<T>> {
        #[cfg(test)]
        if fail::should_fail() {
            return Err(node);
        }

        let layout = Layout::new::<Node<T>>();
        // SAFETY: Node<T> always holds two links, so the layout is never zero-sized.
        let ptr = unsafe { alloc::alloc(layout) }.cast::<Node<T>>();

        match NonNull::new(ptr) {
            Some(ptr) => {
                // SAFETY: ptr was just allocated with the layout of Node<T> and is non-null.
                unsafe { ptr.as_ptr().write(node) };
                Ok(NodeRef(ptr))
            },
            None => Err(node),
        }
    }

    /// Moves the node back off the heap, freeing its allocation.
    ///
    /// The node must already be unlinked, no other NodeRef to it may be used afterwards.
    pub fn take_node(self) -> Node<T> {
        // SAFETY: The node was allocated by the global allocator using the layout of Node<T>,
        // which is exactly what Box<Node<T>> expects.
        unsafe { *Box::from_raw(self.0.as_ptr()) }
    }
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<T> {}

impl<T> PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for NodeRef<T> {}

impl<T> Debug for NodeRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.0).finish()
    }
}

pub(crate) struct Node<T> {
    pub entry: Entry<T>,
    pub prev: Link<T>,
    pub next: Link<T>,
}

impl<T> Node<T> {
    pub const fn detached(entry: Entry<T>) -> Node<T> {
        Node {
            entry,
            prev: None,
            next: None,
        }
    }
}
