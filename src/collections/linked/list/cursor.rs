use parking_lot::MutexGuard;
use tracing::trace;

use super::{EntryGuard, LockedList};

/// The list's single iteration cursor.
///
/// The cursor walks from head to tail, one entry per call to [`cursor_next`](Self::cursor_next).
/// It is shared by every user of the list and each call only locks the list for its own duration,
/// so a reset followed by a series of `cursor_next` calls is not atomic. Other threads may mutate
/// the list, or move the cursor, in between calls. Callers that need a consistent walk should
/// confine iteration to one thread or synchronize externally, or use
/// [`foreach`](Self::foreach) instead.
///
/// Removing the entry the cursor is about to yield moves the cursor on to that entry's successor.
impl<T> LockedList<T> {
    /// Points the cursor at the first entry of the list.
    pub fn cursor_reset(&self) {
        let mut chain = self.chain.lock();
        chain.cursor = chain.state.head();
        trace!(len = chain.state.len(), "cursor_reset");
    }

    /// Returns the entry under the cursor and advances the cursor toward the back. Once the cursor
    /// has passed the last entry this returns [`None`] and changes nothing, until the cursor is
    /// reset.
    pub fn cursor_next(&self) -> Option<EntryGuard<'_, T>> {
        MutexGuard::try_map(self.chain.lock(), |chain| {
            let mut node = chain.cursor?;
            chain.cursor = *node.next();
            Some(node.entry_mut())
        })
        .ok()
    }

    /// Resets the cursor and returns the first entry, advancing past it. The same as calling
    /// [`cursor_reset`](Self::cursor_reset) followed by [`cursor_next`](Self::cursor_next).
    pub fn cursor_first(&self) -> Option<EntryGuard<'_, T>> {
        self.cursor_reset();
        self.cursor_next()
    }
}
