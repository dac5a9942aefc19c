use std::fmt::{self, Debug, Formatter};

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use super::{ByteLen, Chain, Destructors, Entry, Link, ListState, Node, NodeRef, Side};
use crate::util::error::{IndexOutOfBounds, InsertError};

/// Exclusive access to a single [`Entry`] of a [`LockedList`]. The list stays locked for as long as
/// the guard is alive.
pub type EntryGuard<'a, T> = MappedMutexGuard<'a, Entry<T>>;

/// A doubly linked list guarded by a single coarse lock, usable as a stack, a queue or a deque from
/// any number of threads.
///
/// Each entry holds a payload and the payload's length in bytes. The length is purely
/// informational as far as the list is concerned: it is recorded on insertion and handed back
/// alongside the payload.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of entries in the LockedList.
/// - `i`: The index of the entry in question.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `front/back` | `O(1)` |
/// | `push_front/back` | `O(1)` |
/// | `pop_front/back` | `O(1)` |
/// | `get` | `O(min(i, n-i))` |
/// | `remove_nth` | `O(min(i, n-i))` |
/// | `take_nth` | `O(min(i, n-i))` |
/// | `try_insert` | `O(min(i, n-i))` |
/// | `cursor_next` | `O(1)` |
/// | `foreach` | `O(n)` |
/// | `foreach_remove` | `O(n)` |
/// | `map` | `O(n)` |
/// | `join` | `O(n)` |
///
/// # Locking
/// Every method locks the list for its own duration. Guards returned by [`get`](Self::get),
/// [`front`](Self::front), [`back`](Self::back) and the cursor methods keep it locked until they
/// are dropped. Calling any method of a list while holding one of its guards, or from within a
/// callback it is running, deadlocks the calling thread.
pub struct LockedList<T> {
    pub(crate) chain: Mutex<Chain<T>>,
    pub(crate) destructors: Destructors<T>,
}

impl<T> LockedList<T> {
    /// Creates a new LockedList with no elements and no default destructor.
    ///
    /// Payloads destroyed by this list without an overriding destructor are forgotten rather than
    /// dropped.
    pub const fn new() -> LockedList<T> {
        LockedList {
            chain: Mutex::new(Chain::new()),
            destructors: Destructors::none(),
        }
    }

    /// Creates a new LockedList with no elements, which destroys payloads with `destructor` unless
    /// an overriding destructor is provided.
    ///
    /// Passing [`drop`] gives the usual Rust behaviour of dropping destroyed payloads.
    pub fn with_destructor<F>(destructor: F) -> LockedList<T>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        LockedList {
            chain: Mutex::new(Chain::new()),
            destructors: Destructors::with_default(destructor),
        }
    }

    /// Returns the number of entries in the LockedList.
    pub fn len(&self) -> usize {
        self.chain.lock().state.len()
    }

    /// Returns true if the LockedList contains no entries.
    pub fn is_empty(&self) -> bool {
        self.chain.lock().state.is_empty()
    }

    /// Adds `value` to the back of the list, with a byte length of zero.
    pub fn push_back(&self, value: T) -> Result<(), InsertError<T>> {
        self.push_back_sized(value, 0)
    }

    /// Adds `value` to the back of the list, recording its length as `byte_len`.
    ///
    /// If memory for the entry can't be allocated, the list is left as it was and `value` is
    /// returned inside the error.
    pub fn push_back_sized(&self, value: T, byte_len: usize) -> Result<(), InsertError<T>> {
        self.push_end(value, byte_len, Side::After)
    }

    /// Adds `value` to the front of the list, with a byte length of zero.
    pub fn push_front(&self, value: T) -> Result<(), InsertError<T>> {
        self.push_front_sized(value, 0)
    }

    /// Adds `value` to the front of the list, recording its length as `byte_len`.
    ///
    /// If memory for the entry can't be allocated, the list is left as it was and `value` is
    /// returned inside the error.
    pub fn push_front_sized(&self, value: T, byte_len: usize) -> Result<(), InsertError<T>> {
        self.push_end(value, byte_len, Side::Before)
    }

    /// Adds `value` to the end of the queue. The same as [`push_back`](Self::push_back).
    pub fn enqueue(&self, value: T) -> Result<(), InsertError<T>> {
        self.push_back(value)
    }

    /// Adds `value` to the end of the queue. The same as
    /// [`push_back_sized`](Self::push_back_sized).
    pub fn enqueue_sized(&self, value: T, byte_len: usize) -> Result<(), InsertError<T>> {
        self.push_back_sized(value, byte_len)
    }

    /// Removes the last entry and returns its payload, if the list isn't empty. No destructor is
    /// invoked, ownership of the payload moves to the caller.
    pub fn pop_back(&self) -> Option<T> {
        self.pop_back_entry().map(Entry::into_value)
    }

    /// Removes the last entry and returns it along with its byte length, if the list isn't empty.
    pub fn pop_back_entry(&self) -> Option<Entry<T>> {
        self.pop_end(Side::After)
    }

    /// Removes the first entry and returns its payload, if the list isn't empty. No destructor is
    /// invoked, ownership of the payload moves to the caller.
    pub fn pop_front(&self) -> Option<T> {
        self.pop_front_entry().map(Entry::into_value)
    }

    /// Removes the first entry and returns it along with its byte length, if the list isn't empty.
    pub fn pop_front_entry(&self) -> Option<Entry<T>> {
        self.pop_end(Side::Before)
    }

    /// Removes the entry at the start of the queue. The same as [`pop_front`](Self::pop_front).
    pub fn dequeue(&self) -> Option<T> {
        self.pop_front()
    }

    /// Removes the entry at the start of the queue. The same as
    /// [`pop_front_entry`](Self::pop_front_entry).
    pub fn dequeue_entry(&self) -> Option<Entry<T>> {
        self.pop_front_entry()
    }

    /// Returns the first entry, if it exists.
    pub fn front(&self) -> Option<EntryGuard<'_, T>> {
        self.entry_guard(|state| state.head()).ok()
    }

    /// Returns the last entry, if it exists.
    pub fn back(&self) -> Option<EntryGuard<'_, T>> {
        self.entry_guard(|state| state.tail()).ok()
    }

    /// Returns the entry at `index`, counting from the front of the list.
    pub fn get(&self, index: usize) -> Result<EntryGuard<'_, T>, IndexOutOfBounds> {
        self.entry_guard(|state| state.find_by_index(index))
            .map_err(|len| IndexOutOfBounds { index, len })
    }

    /// Removes the entry at `index` and destroys its payload with the list's default destructor.
    pub fn remove_nth(&self, index: usize) -> Result<(), IndexOutOfBounds> {
        self.remove_index(index, None)
    }

    /// Removes the entry at `index` and destroys its payload with `destructor`, which is used in
    /// place of the list's default.
    pub fn remove_nth_with<D: Fn(T)>(
        &self,
        index: usize,
        destructor: D,
    ) -> Result<(), IndexOutOfBounds> {
        self.remove_index(index, Some(&destructor))
    }

    /// Removes the entry at `index` and returns it, without invoking any destructor.
    pub fn take_nth(&self, index: usize) -> Result<Entry<T>, IndexOutOfBounds> {
        let mut chain = self.chain.lock();
        let len = chain.state.len();
        let node = chain.state.find_by_index(index).ok_or(IndexOutOfBounds { index, len })?;
        trace!(index, len, "take_nth");
        Ok(chain.take(node))
    }

    /// Inserts `value` so that it ends up at `index`, shifting the entry previously there (and all
    /// following it) toward the back. An `index` equal to the length appends.
    pub fn try_insert(
        &self,
        index: usize,
        value: T,
        byte_len: usize,
    ) -> Result<(), InsertError<T>> {
        let mut chain = self.chain.lock();
        let len = chain.state.len();

        let (anchor, side) = match index {
            val if val == len => (None, Side::After),
            val if val < len => (chain.state.find_by_index(val), Side::Before),
            _ => return Err(InsertError::index(value, index, len)),
        };

        let node = allocate(value, byte_len)?;
        chain.state.insert_at(node, anchor, side);
        trace!(index, len = len + 1, "try_insert");
        Ok(())
    }

    /// Destroys the list, destroying all remaining payloads with the default destructor. The same
    /// as dropping it.
    pub fn destroy(self) {
        drop(self);
    }

    /// Destroys the list, destroying all remaining payloads with `destructor`, which is used in place
    /// of the list's default.
    pub fn destroy_with<D: Fn(T)>(mut self, destructor: D) {
        self.destroy_entries(Some(&destructor));
    }

    /// Checks every link of the chain, see [`ListState::verify_links`].
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn verify_links(&self) {
        self.chain.lock().state.verify_links();
    }

    fn push_end(&self, value: T, byte_len: usize, side: Side) -> Result<(), InsertError<T>> {
        // Allocated before locking, so that the lock isn't held across the allocator.
        let node = allocate(value, byte_len)?;

        let mut chain = self.chain.lock();
        chain.state.insert_at(node, None, side);
        trace!(?side, byte_len, len = chain.state.len(), "push");
        Ok(())
    }

    fn pop_end(&self, side: Side) -> Option<Entry<T>> {
        let mut chain = self.chain.lock();
        let node = match side {
            Side::Before => chain.state.head(),
            Side::After => chain.state.tail(),
        }?;
        let entry = chain.take(node);
        trace!(?side, len = chain.state.len(), "pop");
        Some(entry)
    }

    fn remove_index(
        &self,
        index: usize,
        overriding: Option<&dyn Fn(T)>,
    ) -> Result<(), IndexOutOfBounds> {
        let mut chain = self.chain.lock();
        let len = chain.state.len();
        let node = chain.state.find_by_index(index).ok_or(IndexOutOfBounds { index, len })?;
        chain.remove(node, &self.destructors, overriding);
        trace!(index, len = len - 1, "remove_nth");
        Ok(())
    }

    /// Locks the list and maps the guard onto the entry `find` picks, returning the list's length
    /// if it picks nothing.
    fn entry_guard<F>(&self, find: F) -> Result<EntryGuard<'_, T>, usize>
    where
        F: FnOnce(&ListState<T>) -> Link<T>,
    {
        let mut len = 0;
        MutexGuard::try_map(self.chain.lock(), |chain| {
            len = chain.state.len();
            find(&chain.state).map(|mut node| node.entry_mut())
        })
        .map_err(|_| len)
    }

    fn destroy_entries(&mut self, overriding: Option<&dyn Fn(T)>) {
        let chain = self.chain.get_mut();
        let len = chain.state.len();
        let mut curr = chain.state.head();

        chain.cursor = None;
        chain.state = ListState::Empty;

        while let Some(ptr) = curr {
            curr = *ptr.next();
            self.destructors.dispose(ptr.take_node().entry.into_value(), overriding);
        }

        if len > 0 {
            debug!(len, "destroyed list entries");
        }
    }
}

/// Insertion of text payloads, where the byte length can be derived from the payload itself.
impl<T: AsRef<[u8]>> LockedList<T> {
    /// Adds `value` to the back of the list, with its length resolved from `byte_len`.
    pub fn push_back_with(&self, value: T, byte_len: ByteLen) -> Result<(), InsertError<T>> {
        let byte_len = byte_len.resolve(&value);
        self.push_back_sized(value, byte_len)
    }

    /// Adds `value` to the front of the list, with its length resolved from `byte_len`.
    pub fn push_front_with(&self, value: T, byte_len: ByteLen) -> Result<(), InsertError<T>> {
        let byte_len = byte_len.resolve(&value);
        self.push_front_sized(value, byte_len)
    }

    /// Adds the text `value` to the back of the list, see [`ByteLen::Text`].
    pub fn push_back_str(&self, value: T) -> Result<(), InsertError<T>> {
        self.push_back_with(value, ByteLen::Text)
    }

    /// Adds the text `value` to the front of the list, see [`ByteLen::Text`].
    pub fn push_front_str(&self, value: T) -> Result<(), InsertError<T>> {
        self.push_front_with(value, ByteLen::Text)
    }

    /// Adds the text `value` to the end of the queue. The same as
    /// [`push_back_str`](Self::push_back_str).
    pub fn enqueue_str(&self, value: T) -> Result<(), InsertError<T>> {
        self.push_back_str(value)
    }
}

fn allocate<T>(value: T, byte_len: usize) -> Result<NodeRef<T>, InsertError<T>> {
    NodeRef::try_from_node(Node::detached(Entry::new(value, byte_len))).map_err(|node| {
        warn!(byte_len, "failed to allocate a list entry");
        InsertError::alloc(node.entry.into_value())
    })
}

impl<T> Default for LockedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LockedList<T> {
    fn drop(&mut self) {
        self.destroy_entries(None);
    }
}

impl<T: Debug> Debug for LockedList<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let chain = self.chain.lock();
        f.debug_struct("LockedList")
            .field("entries", &DebugEntries(&chain.state))
            .field("len", &chain.state.len())
            .field("destructor", &self.destructors.has_default())
            .finish()
    }
}

struct DebugEntries<'a, T>(&'a ListState<T>);

impl<T: Debug> Debug for DebugEntries<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.nodes().map(|node| node.entry())).finish()
    }
}
