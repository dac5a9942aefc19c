//! General-purpose collection types.
//!
//! # Purpose
//! At the moment this only holds the [`linked`] collections, which revolve around
//! [`LockedList`](linked::LockedList).

pub mod linked;
