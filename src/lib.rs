//! A thread-safe, doubly linked sequence container with stack, queue and deque access patterns.
//!
//! # Purpose
//! [`LockedList`] is a single list type that can be shared between threads and used as a stack
//! (`push_back` / `pop_back`), a queue (`enqueue` / `dequeue`) or a deque (both ends). On top of
//! that it offers positional access, a stateful iteration cursor and bulk operators which traverse
//! the whole list while holding its lock.
//!
//! # Method
//! Every list owns a chain of heap allocated entries. Each entry owns its payload along with a byte
//! length for that payload, and the links between entries are plain pointers which are only ever
//! touched while the list's lock is held. The lock is coarse: one [`parking_lot::Mutex`] per list,
//! guarding every structural change and every whole-list traversal.
//!
//! # Ownership
//! A list can be created with a default destructor, which is invoked on payloads that are
//! destroyed by the list (destructive removal or dropping the list). Operations that destroy
//! payloads also come in a `*_with` form that takes an overriding destructor for that call only.
//! When neither is present, payloads are forgotten rather than dropped: the list never destroys
//! what it wasn't told how to destroy.
//!
//! Removals that hand the payload back to the caller (`pop_*`, `dequeue`, `take_nth`) never invoke
//! any destructor.
//!
//! # Error Handling
//! Two kinds of failure exist. Allocation failures are reported as an [`InsertError`] which gives
//! the payload back to the caller, leaving the list untouched. Operations on absent elements return
//! [`None`] or an [`IndexOutOfBounds`]. Internal consistency of the
//! chain is checked with debug assertions, which are compiled out of release builds.
//!
//! # Reentrancy
//! Callbacks passed to bulk operators run while the list is locked, and so are the guards returned
//! by accessors such as [`LockedList::get`]. Calling back into the same list from within one of
//! these will deadlock.

#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod collections;

pub(crate) mod util;

#[doc(inline)]
pub use collections::linked::{ByteLen, Entry, EntryGuard, LockedList};
#[doc(inline)]
pub use util::error::{AllocError, IndexOutOfBounds, InsertError, InsertFailure};
