//! Linked collection types. Primarily revolves around [`LockedList`] and its accompanying
//! [`Entry`] type.

pub mod list;

#[doc(inline)]
pub use list::{ByteLen, Entry, EntryGuard, LockedList};
