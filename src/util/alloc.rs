#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A payload which counts how many times values sharing its counter have been dropped. Clones
/// share the counter.
#[derive(Debug, Clone)]
pub struct CountedDrop(pub Arc<AtomicUsize>);

impl CountedDrop {
    pub fn new() -> CountedDrop {
        CountedDrop(Arc::new(AtomicUsize::new(0)))
    }

    pub fn drops(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Drop for CountedDrop {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
