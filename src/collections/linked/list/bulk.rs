use std::ops::ControlFlow;

use tracing::debug;

use super::LockedList;
use crate::util::error::AllocError;

/// Whole-list operators. Each of these locks the list once and holds the lock for the entire
/// traversal, including every call to the provided callback. Callbacks must not use the list they
/// are called from.
impl<T> LockedList<T> {
    /// Calls `f` with the payload and byte length of each entry, from front to back, stopping early
    /// if `f` returns [`ControlFlow::Break`].
    ///
    /// Returns the number of entries visited, including the one which stopped the walk.
    pub fn foreach<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&T, usize) -> ControlFlow<()>,
    {
        let chain = self.chain.lock();
        let mut visited = 0;

        for node in chain.state.nodes() {
            visited += 1;
            let entry = node.entry();
            if f(entry.value(), entry.byte_len()).is_break() {
                break;
            }
        }

        debug!(visited, len = chain.state.len(), "foreach");
        visited
    }

    /// Removes every entry for which `predicate` returns true, destroying the payloads with the
    /// list's default destructor. Returns the number of entries removed.
    pub fn foreach_remove<P>(&self, predicate: P) -> usize
    where
        P: FnMut(&T, usize) -> bool,
    {
        self.remove_where(predicate, None)
    }

    /// Removes every entry for which `predicate` returns true, destroying the payloads with
    /// `destructor`, which is used in place of the list's default. Returns the number of entries
    /// removed.
    pub fn foreach_remove_with<P, D>(&self, predicate: P, destructor: D) -> usize
    where
        P: FnMut(&T, usize) -> bool,
        D: Fn(T),
    {
        self.remove_where(predicate, Some(&destructor))
    }

    /// Builds a new list from the result of `transform` for each entry, in order. `transform`
    /// returns the new payload along with its byte length.
    ///
    /// The source list is left untouched and no destructor is invoked on it. The new list has its
    /// own lock and no default destructor. If an entry of the new list can't be allocated, the
    /// payloads produced so far are dropped and [`AllocError`] is returned.
    pub fn map<U, F>(&self, mut transform: F) -> Result<LockedList<U>, AllocError>
    where
        F: FnMut(&T, usize) -> (U, usize),
    {
        let mapped = LockedList::new();
        let mut failed = false;

        self.foreach(|value, byte_len| {
            let (value, byte_len) = transform(value, byte_len);
            match mapped.push_back_sized(value, byte_len) {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => {
                    failed = true;
                    ControlFlow::Break(())
                },
            }
        });

        if failed {
            mapped.destroy_with(drop);
            return Err(AllocError);
        }

        debug!(len = mapped.len(), "map");
        Ok(mapped)
    }

    fn remove_where<P>(&self, mut predicate: P, overriding: Option<&dyn Fn(T)>) -> usize
    where
        P: FnMut(&T, usize) -> bool,
    {
        let mut chain = self.chain.lock();
        let mut removed = 0;
        let mut curr = chain.state.head();

        while let Some(node) = curr {
            // Read before the node is possibly freed.
            curr = *node.next();

            let entry = node.entry();
            if predicate(entry.value(), entry.byte_len()) {
                chain.remove(node, &self.destructors, overriding);
                removed += 1;
            }
        }

        #[cfg(debug_assertions)]
        chain.state.verify_links();

        debug!(removed, len = chain.state.len(), "foreach_remove");
        removed
    }
}

impl<T: AsRef<str>> LockedList<T> {
    /// Concatenates the payloads from front to back, with `delimiter` between each pair.
    ///
    /// ```
    /// # use locked_list::LockedList;
    /// let list = LockedList::new();
    /// for word in ["a", "b", "c"] {
    ///     list.push_back_str(word).unwrap();
    /// }
    /// assert_eq!(list.join(",").unwrap(), "a,b,c");
    /// ```
    pub fn join(&self, delimiter: &str) -> Result<String, AllocError> {
        let mut buffer = String::new();
        let mut appended = 0_usize;
        let mut result = Ok(());

        self.foreach(|value, _| {
            if appended > 0 {
                result = append(&mut buffer, delimiter);
            }
            result = result.and_then(|()| append(&mut buffer, value.as_ref()));
            appended += 1;

            match result {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => ControlFlow::Break(()),
            }
        });

        debug!(appended, bytes = buffer.len(), "join");
        result.map(|()| buffer)
    }
}

/// Appends `text` to the join buffer, reporting allocation failure rather than aborting.
fn append(buffer: &mut String, text: &str) -> Result<(), AllocError> {
    buffer.try_reserve(text.len()).map_err(|_| AllocError)?;
    buffer.push_str(text);
    Ok(())
}
