//! Time-ordered index of readings
//!
//! [`BalancedTimeIndex`] keeps every reading the orchestrator has seen in an
//! [`AvlTree`], keyed by `(timestamp, sensor_id)`. A second reading for the same
//! sensor at the same instant is ignored, never overwritten.

use crate::avl::{AvlTree, Iter};
use crate::reading::{Classification, Reading};
use crate::time::Timestamp;

/// AVL-backed index of readings ordered by time
#[derive(Debug, Default)]
pub struct BalancedTimeIndex {
    tree: AvlTree<Reading>,
}

impl BalancedTimeIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self { tree: AvlTree::new() }
    }

    /// Index a reading; `false` if one with the same key is already present
    pub fn insert(&mut self, reading: Reading) -> bool {
        self.tree.insert(reading)
    }

    /// Whether a reading with this key is indexed
    pub fn search(&self, reading: &Reading) -> bool {
        self.tree.contains(reading)
    }

    /// The indexed reading of `sensor` at exactly `timestamp`
    pub fn get(&self, timestamp: Timestamp, sensor: &str) -> Option<&Reading> {
        let probe = Reading::new(timestamp, sensor, 0.0, Classification::Normal);
        self.tree.get(&probe)
    }

    /// Readings ordered between two keys, inclusive
    pub fn range_query(&self, min: &Reading, max: &Reading) -> Vec<&Reading> {
        self.tree.range(min, max)
    }

    /// Readings with `min <= timestamp <= max`, in order
    pub fn range_by_time(&self, min: Timestamp, max: Timestamp) -> Vec<&Reading> {
        self.tree.range_by_key(&min, &max, Reading::timestamp)
    }

    /// Every reading in order
    pub fn inorder(&self) -> Vec<&Reading> {
        self.tree.inorder()
    }

    /// In-order iterator
    pub fn iter(&self) -> Iter<'_, Reading> {
        self.tree.iter()
    }

    /// Height of the underlying tree
    pub fn height(&self) -> u32 {
        self.tree.height()
    }

    /// Number of indexed readings
    pub fn size(&self) -> usize {
        self.tree.len()
    }

    /// Whether nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Oldest indexed reading
    pub fn earliest(&self) -> Option<&Reading> {
        self.tree.min()
    }

    /// Newest indexed reading
    pub fn latest(&self) -> Option<&Reading> {
        self.tree.max()
    }

    /// Whether the AVL invariant holds
    pub fn is_balanced(&self) -> bool {
        self.tree.is_balanced()
    }
}
