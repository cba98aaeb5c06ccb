//! Processed-id cache
//!
//! Remembers which command ids were already dispatched so a batch that is
//! read twice (for example because clearing the command file failed) does not
//! run twice. Bounded; eviction is strictly oldest first.

use std::collections::{HashSet, VecDeque};

/// Default number of remembered ids
pub const DEFAULT_DEDUPE_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct ProcessedIdSet {
    order: VecDeque<String>,
    ids: HashSet<String>,
    capacity: usize,
}

impl Default for ProcessedIdSet {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUPE_CAPACITY)
    }
}

impl ProcessedIdSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity + 1),
            ids: HashSet::with_capacity(capacity + 1),
            capacity: capacity.max(1),
        }
    }

    /// Record an id; false if it was already present
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string());
        self.order.push_back(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Evict oldest ids until back within capacity; returns how many went
    pub fn trim(&mut self) -> usize {
        let mut evicted = 0;
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
                evicted += 1;
            }
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
