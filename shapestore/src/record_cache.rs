//! Bounded cache of decoded records.
//!
//! Decoding is idempotent and side-effect free, so an evicted record can
//! always be re-decoded at the cost of one more read. The cache therefore
//! only has to bound memory, not guarantee retention. Eviction is
//! insertion-order based: once the capacity is exceeded, the oldest
//! inserted entry still present goes first. Reads do not refresh an
//! entry's position.
//!
//! The struct itself is plain mutable state; the store wraps it in a lock.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::shapefile::Record;
use crate::spatial_index::RecordId;

pub struct RecordCache {
    records: HashMap<RecordId, Arc<Record>>,
    /// Insertion order (front = oldest, back = newest).
    insertion_order: VecDeque<RecordId>,
    capacity: usize,
}

impl RecordCache {
    /// Create a cache holding at most `capacity` decoded records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity,
        }
    }

    /// Get a cached record. Does not affect eviction order.
    pub fn get(&self, record_number: RecordId) -> Option<Arc<Record>> {
        self.records.get(&record_number).cloned()
    }

    /// Insert a decoded record, evicting the oldest entries once the
    /// capacity is exceeded. Re-inserting an existing key moves it to the
    /// newest position.
    pub fn insert(&mut self, record_number: RecordId, record: Arc<Record>) {
        if self.records.contains_key(&record_number) {
            self.insertion_order.retain(|&id| id != record_number);
        }
        self.insertion_order.push_back(record_number);
        self.records.insert(record_number, record);

        while self.records.len() > self.capacity {
            if self.evict_oldest().is_none() {
                break;
            }
        }
    }

    /// Remove and return the oldest inserted entry still present.
    fn evict_oldest(&mut self) -> Option<RecordId> {
        while let Some(record_number) = self.insertion_order.pop_front() {
            if self.records.remove(&record_number).is_some() {
                return Some(record_number);
            }
        }
        None
    }

    pub fn contains(&self, record_number: RecordId) -> bool {
        self.records.contains_key(&record_number)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
