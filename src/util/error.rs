use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use derive_more::{Display, Error, From, IsVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    pub index: usize,
    pub len: usize,
}

impl Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Index {} out of bounds for collection with {} elements!", self.index, self.len)
    }
}

impl Error for IndexOutOfBounds {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityOverflow;

impl Display for CapacityOverflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Capacity overflow!")
    }
}

impl Error for CapacityOverflow {}

/// The allocator couldn't provide memory for an operation. Nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl Display for AllocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Memory allocation failed!")
    }
}

impl Error for AllocError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From, IsVariant)]
pub enum InsertFailure {
    IndexOutOfBounds(IndexOutOfBounds),
    AllocError(AllocError),
}

/// An insertion failed. The list is unchanged and the payload is handed back through `value`.
#[derive(Clone, PartialEq, Eq)]
pub struct InsertError<T> {
    pub value: T,
    pub kind: InsertFailure,
}

impl<T> InsertError<T> {
    pub(crate) const fn alloc(value: T) -> InsertError<T> {
        InsertError {
            value,
            kind: InsertFailure::AllocError(AllocError),
        }
    }

    pub(crate) const fn index(value: T, index: usize, len: usize) -> InsertError<T> {
        InsertError {
            value,
            kind: InsertFailure::IndexOutOfBounds(IndexOutOfBounds { index, len }),
        }
    }

    /// Consumes the error, returning the payload that couldn't be inserted.
    pub fn into_value(self) -> T {
        self.value
    }
}

// The payload isn't required to be Debug, so it is left out.
impl<T> Debug for InsertError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> Display for InsertError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Insertion failed: {}", self.kind)
    }
}

impl<T> Error for InsertError<T> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}
