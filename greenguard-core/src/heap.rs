//! Binary Min-Heap Priority Queue
//!
//! ## Overview
//!
//! Pending alarms are kept in a binary min-heap so the most urgent one is always
//! at the root. The heap is generic over any `T: Ord`; [`AlarmQueue`] is the
//! instantiation the orchestrator owns, ordered by [`Alarm`]'s urgency order.
//!
//! ## Layout
//!
//! The heap is a dense `Vec`. For index `i` the children are `2i + 1` and
//! `2i + 2`, the parent is `(i - 1) / 2`.
//!
//! ```text
//!            [0]
//!          /     \
//!        [1]     [2]
//!       /  \     /  \
//!     [3]  [4] [5]  [6]
//! ```
//!
//! Invariant: `items[i] <= items[child]` for every child of every `i`.
//!
//! ## Complexity
//!
//! | Operation     | Time       |
//! |---------------|------------|
//! | `insert`      | O(log n)   |
//! | `extract_min` | O(log n)   |
//! | `peek_min`    | O(1)       |
//! | `from_vec`    | O(n)       |
//!
//! The queue never deduplicates: two identical alarms are two entries.

use crate::alarm::Alarm;
use crate::errors::{ControlError, ControlResult};

const STRUCTURE: &str = "priority queue";

/// Priority queue of pending alarms, most urgent first
pub type AlarmQueue = MinHeap<Alarm>;

/// Heap activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Total items inserted
    pub pushed: u32,
    /// Total items extracted
    pub popped: u32,
    /// Largest size seen
    pub max_depth: u32,
}

/// Binary min-heap over a dense vector
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    items: Vec<T>,
    stats: HeapStats,
}

impl<T: Ord> MinHeap<T> {
    /// Create an empty heap
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            stats: HeapStats::default(),
        }
    }

    /// Heapify an existing sequence in O(n)
    ///
    /// Sifts down from the last internal node to the root.
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut heap = Self {
            items,
            stats: HeapStats::default(),
        };
        let len = heap.items.len();
        for i in (0..len / 2).rev() {
            heap.sift_down(i);
        }
        heap.stats.max_depth = len as u32;
        heap
    }

    /// Add an item
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        let last = self.items.len() - 1;
        self.sift_up(last);

        self.stats.pushed = self.stats.pushed.saturating_add(1);
        self.stats.max_depth = self.stats.max_depth.max(self.items.len() as u32);
    }

    /// Remove and return the smallest item
    pub fn extract_min(&mut self) -> ControlResult<T> {
        if self.items.is_empty() {
            return Err(ControlError::EmptyStructure { structure: STRUCTURE });
        }

        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let min = self
            .items
            .pop()
            .ok_or(ControlError::EmptyStructure { structure: STRUCTURE })?;
        if !self.items.is_empty() {
            self.sift_down(0);
        }

        self.stats.popped = self.stats.popped.saturating_add(1);
        Ok(min)
    }

    /// Smallest item without removing it
    pub fn peek_min(&self) -> ControlResult<&T> {
        self.items
            .first()
            .ok_or(ControlError::EmptyStructure { structure: STRUCTURE })
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the heap holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every item; counters are kept
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items in storage order (not sorted)
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consume the heap into ascending order
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.items.len());
        while let Ok(item) = self.extract_min() {
            sorted.push(item);
        }
        sorted
    }

    /// Activity counters
    pub fn stats(&self) -> HeapStats {
        self.stats
    }

    /// Check the heap property at every index
    pub fn is_valid(&self) -> bool {
        (1..self.items.len()).all(|i| self.items[(i - 1) / 2] <= self.items[i])
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.items[index] < self.items[parent] {
                self.items.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.items[left] < self.items[smallest] {
                smallest = left;
            }
            if right < len && self.items[right] < self.items[smallest] {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.items.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T: Ord> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for MinHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a MinHeap<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Severity;

    fn alarm(severity: Severity, timestamp: u64) -> Alarm {
        Alarm::new(severity, timestamp, "TEST", "test alarm", "TEMP", 0.0)
    }

    #[test]
    fn empty_heap_fails_fast() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        assert_eq!(
            heap.extract_min(),
            Err(ControlError::EmptyStructure { structure: "priority queue" })
        );
        assert!(heap.peek_min().is_err());
    }

    #[test]
    fn extracts_in_ascending_order() {
        let mut heap = MinHeap::new();
        for value in [5, 3, 8, 1, 9, 2, 7] {
            heap.insert(value);
            assert!(heap.is_valid());
        }
        assert_eq!(*heap.peek_min().unwrap(), 1);

        let mut out = Vec::new();
        while let Ok(v) = heap.extract_min() {
            assert!(heap.is_valid());
            out.push(v);
        }
        assert_eq!(out, vec![1, 2, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn heapify_existing_sequence() {
        let heap = MinHeap::from_vec(vec![9, 4, 7, 1, 8, 2, 6, 3, 5]);
        assert!(heap.is_valid());
        assert_eq!(heap.len(), 9);
        assert_eq!(heap.into_sorted_vec(), (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn duplicates_coexist() {
        let mut heap: MinHeap<i32> = [4, 4, 4].into_iter().collect();
        heap.insert(4);
        assert_eq!(heap.len(), 4);
        for _ in 0..4 {
            assert_eq!(heap.extract_min().unwrap(), 4);
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn alarm_queue_orders_by_urgency() {
        let mut queue = AlarmQueue::new();
        queue.insert(alarm(Severity::Medium, 10));
        queue.insert(alarm(Severity::Critical, 1));
        queue.insert(alarm(Severity::Critical, 7));
        queue.insert(alarm(Severity::High, 50));

        let order: Vec<(Severity, u64)> = queue
            .into_sorted_vec()
            .iter()
            .map(|a| (a.severity(), a.timestamp()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Severity::Critical, 7),
                (Severity::Critical, 1),
                (Severity::High, 50),
                (Severity::Medium, 10),
            ]
        );
    }

    #[test]
    fn stats_track_activity() {
        let mut heap = MinHeap::new();
        heap.insert(3);
        heap.insert(1);
        heap.extract_min().unwrap();
        heap.clear();

        let stats = heap.stats();
        assert_eq!(stats.pushed, 2);
        assert_eq!(stats.popped, 1);
        assert_eq!(stats.max_depth, 2);
        assert!(heap.is_empty());
    }
}
