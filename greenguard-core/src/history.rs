//! Bounded Reading History
//!
//! ## Overview
//!
//! [`BoundedHistory`] is an ordered sequence with O(1) insertion at the tail and
//! O(1) eviction at the head. The orchestrator appends every reading of a tick
//! and then calls [`BoundedHistory::enforce_cap`], which evicts oldest-first
//! until the size is back at the configured capacity.
//!
//! ## Design
//!
//! A doubly-linked list stored in an arena. Nodes live in a `Vec` and link to
//! each other by index; freed slots go on a free list and are reused. There are
//! no owning pointers between nodes, so dropping the history is a plain `Vec`
//! drop with no recursion.
//!
//! ```text
//!   head                               tail
//!    │                                  │
//!    ▼                                  ▼
//!  ┌────┐ next ┌────┐ next ┌────┐ next ┌────┐
//!  │ r0 │─────▶│ r1 │─────▶│ r2 │─────▶│ r3 │
//!  │    │◀─────│    │◀─────│    │◀─────│    │
//!  └────┘ prev └────┘ prev └────┘ prev └────┘
//! ```
//!
//! The list itself never evicts on `append`; the cap is applied by the owner.

use log::debug;

use crate::constants::DEFAULT_HISTORY_CAPACITY;
use crate::errors::{ControlError, ControlResult};

const STRUCTURE: &str = "history";

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Ordered sequence with a size cap and FIFO eviction
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    /// Create an empty history holding at most `capacity` elements after
    /// [`enforce_cap`](Self::enforce_cap)
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            capacity,
        }
    }

    /// Configured cap
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append at the tail in O(1)
    pub fn append(&mut self, value: T) {
        let slot = Slot {
            value: Some(value),
            prev: self.tail,
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.slots[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    /// Remove and return the oldest element in O(1)
    pub fn evict_oldest(&mut self) -> ControlResult<T> {
        let head = self.head.ok_or(ControlError::EmptyStructure { structure: STRUCTURE })?;
        self.unlink(head)
    }

    /// Remove and return the newest element in O(1)
    pub fn pop_newest(&mut self) -> ControlResult<T> {
        let tail = self.tail.ok_or(ControlError::EmptyStructure { structure: STRUCTURE })?;
        self.unlink(tail)
    }

    /// Evict oldest-first until `len <= capacity`, returning what was evicted
    pub fn enforce_cap(&mut self) -> Vec<T> {
        let mut evicted = Vec::new();
        while self.len > self.capacity {
            match self.evict_oldest() {
                Ok(value) => evicted.push(value),
                Err(_) => break,
            }
        }
        if !evicted.is_empty() {
            debug!("history over capacity {}, evicted {}", self.capacity, evicted.len());
        }
        evicted
    }

    /// Oldest element
    pub fn front(&self) -> ControlResult<&T> {
        self.head
            .and_then(|i| self.slots[i].value.as_ref())
            .ok_or(ControlError::EmptyStructure { structure: STRUCTURE })
    }

    /// Newest element
    pub fn back(&self) -> ControlResult<&T> {
        self.tail
            .and_then(|i| self.slots[i].value.as_ref())
            .ok_or(ControlError::EmptyStructure { structure: STRUCTURE })
    }

    /// Element at `index` counted from the oldest; walks from the nearer end
    pub fn get(&self, index: usize) -> ControlResult<&T> {
        let out_of_range = ControlError::OutOfRange { index, len: self.len };
        if index >= self.len {
            return Err(out_of_range);
        }

        let cursor = if index < self.len / 2 {
            let mut cursor = self.head;
            for _ in 0..index {
                cursor = cursor.and_then(|i| self.slots[i].next);
            }
            cursor
        } else {
            let mut cursor = self.tail;
            for _ in 0..(self.len - 1 - index) {
                cursor = cursor.and_then(|i| self.slots[i].prev);
            }
            cursor
        };

        cursor
            .and_then(|i| self.slots[i].value.as_ref())
            .ok_or(out_of_range)
    }

    /// Iterate oldest to newest; reverse with `.rev()`
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            history: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Iterate newest to oldest
    pub fn iter_rev(&self) -> core::iter::Rev<Iter<'_, T>> {
        self.iter().rev()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn unlink(&mut self, index: usize) -> ControlResult<T> {
        let prev = self.slots[index].prev;
        let next = self.slots[index].next;

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }

        let slot = &mut self.slots[index];
        slot.prev = None;
        slot.next = None;
        let value = slot
            .value
            .take()
            .ok_or(ControlError::EmptyStructure { structure: STRUCTURE })?;

        self.free.push(index);
        self.len -= 1;
        Ok(value)
    }
}

impl<T: PartialEq> BoundedHistory<T> {
    /// Linear membership test
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|v| v == value)
    }
}

impl<T: Clone> BoundedHistory<T> {
    /// Materialise oldest to newest
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Default for BoundedHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Double-ended iterator over a [`BoundedHistory`]
pub struct Iter<'a, T> {
    history: &'a BoundedHistory<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = &self.history.slots[self.front?];
        self.front = slot.next;
        self.remaining -= 1;
        slot.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = &self.history.slots[self.back?];
        self.back = slot.prev;
        self.remaining -= 1;
        slot.value.as_ref()
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a BoundedHistory<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: u32, capacity: usize) -> BoundedHistory<u32> {
        let mut history = BoundedHistory::new(capacity);
        for i in 0..n {
            history.append(i);
        }
        history
    }

    #[test]
    fn empty_history_fails_fast() {
        let mut history: BoundedHistory<u32> = BoundedHistory::default();
        assert_eq!(history.capacity(), 1000);
        assert_eq!(
            history.evict_oldest(),
            Err(ControlError::EmptyStructure { structure: "history" })
        );
        assert!(history.pop_newest().is_err());
        assert!(history.front().is_err());
        assert!(history.back().is_err());
    }

    #[test]
    fn enforce_cap_evicts_fifo() {
        let mut history = filled(8, 5);
        assert_eq!(history.len(), 8);

        let evicted = history.enforce_cap();
        assert_eq!(evicted, vec![0, 1, 2]);
        assert_eq!(history.to_vec(), vec![3, 4, 5, 6, 7]);
        assert!(history.enforce_cap().is_empty());
    }

    #[test]
    fn indexed_access_from_both_ends() {
        let history = filled(7, 10);
        for i in 0..7 {
            assert_eq!(*history.get(i).unwrap(), i as u32);
        }
        assert_eq!(history.get(7), Err(ControlError::OutOfRange { index: 7, len: 7 }));
    }

    #[test]
    fn slots_are_reused() {
        let mut history = filled(3, 3);
        history.evict_oldest().unwrap();
        history.append(10);
        history.pop_newest().unwrap();
        history.append(11);
        assert_eq!(history.to_vec(), vec![1, 2, 11]);
        assert_eq!(history.slots.len(), 3);
    }

    #[test]
    fn reverse_and_mixed_iteration() {
        let history = filled(5, 5);
        let rev: Vec<u32> = history.iter_rev().copied().collect();
        assert_eq!(rev, vec![4, 3, 2, 1, 0]);

        let mut it = history.iter();
        assert_eq!(it.next(), Some(&0));
        assert_eq!(it.next_back(), Some(&4));
        assert_eq!(it.len(), 3);
        assert_eq!(it.collect::<Vec<_>>(), vec![&1, &2, &3]);
    }

    #[test]
    fn membership_and_clear() {
        let mut history = filled(4, 4);
        assert!(history.contains(&2));
        assert!(!history.contains(&9));
        assert_eq!(*history.front().unwrap(), 0);
        assert_eq!(*history.back().unwrap(), 3);

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.iter().count(), 0);
        history.append(1);
        assert_eq!(history.to_vec(), vec![1]);
    }
}
