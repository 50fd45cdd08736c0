use alloc::vec::Vec;

use crate::error::Error;
use crate::heap::{check_decrease, precedes, Handle, PriorityQueue};

struct Entry<T, P> {
    item: T,
    priority: P,
    handle: Handle,
}

/// Array-backed binary min-heap with O(log n) decrease-key.
///
/// `positions[handle]` holds the array slot of every queued entry (`None` once extracted), and is
/// kept in sync on every swap.
pub struct BinaryHeap<T, P> {
    entries: Vec<Entry<T, P>>,
    positions: Vec<Option<usize>>,
}

impl<T, P> Default for BinaryHeap<T, P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: Vec::new(),
        }
    }
}

impl<T, P: PartialOrd> BinaryHeap<T, P> {
    pub fn new() -> Self {
        Self::default()
    }

    fn precedes(&self, i: usize, j: usize) -> bool {
        let (a, b) = (&self.entries[i], &self.entries[j]);
        precedes((&a.priority, a.handle.seq()), (&b.priority, b.handle.seq()))
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.entries.swap(i, j);
        self.positions[self.entries[i].handle.seq()] = Some(i);
        self.positions[self.entries[j].handle.seq()] = Some(j);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.precedes(i, parent) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.entries.len();
        loop {
            let (left, right) = (2 * i + 1, 2 * i + 2);
            let mut smallest = i;
            if left < len && self.precedes(left, smallest) {
                smallest = left;
            }
            if right < len && self.precedes(right, smallest) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }
}

impl<T, P: PartialOrd> PriorityQueue for BinaryHeap<T, P> {
    type Item = T;
    type Priority = P;

    fn insert(&mut self, item: T, priority: P) -> Handle {
        let handle = Handle::new(self.positions.len());
        let slot = self.entries.len();
        self.positions.push(Some(slot));
        self.entries.push(Entry {
            item,
            priority,
            handle,
        });
        self.sift_up(slot);
        handle
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn peek_min(&self) -> Option<(&T, &P)> {
        self.entries.first().map(|e| (&e.item, &e.priority))
    }

    fn extract_min(&mut self) -> Option<(T, P)> {
        let last = self.entries.len().checked_sub(1)?;
        self.swap(0, last);
        let entry = self.entries.pop()?;
        self.positions[entry.handle.seq()] = None;
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((entry.item, entry.priority))
    }

    fn decrease_key(&mut self, handle: Handle, priority: P) -> Result<(), Error> {
        let slot = self
            .positions
            .get(handle.seq())
            .copied()
            .flatten()
            .ok_or(Error::StaleHandle)?;
        check_decrease(&self.entries[slot].priority, &priority)?;
        self.entries[slot].priority = priority;
        self.sift_up(slot);
        Ok(())
    }
}

#[cfg(test)]
impl<T, P: PartialOrd> BinaryHeap<T, P> {
    /// Verifies heap order and the handle-to-position map.
    pub(crate) fn check_invariants(&self) {
        for i in 1..self.entries.len() {
            assert!(!self.precedes(i, (i - 1) / 2), "heap order violated at {i}");
        }
        for (i, entry) in self.entries.iter().enumerate() {
            assert_eq!(self.positions[entry.handle.seq()], Some(i));
        }
        let queued = self.positions.iter().filter(|p| p.is_some()).count();
        assert_eq!(queued, self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::BinaryHeap;
    use crate::error::Error;
    use crate::heap::PriorityQueue;

    fn drain<T, P: PartialOrd>(heap: &mut BinaryHeap<T, P>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some((item, _)) = heap.extract_min() {
            heap.check_invariants();
            out.push(item);
        }
        out
    }

    #[test]
    fn extracts_in_priority_order() {
        let mut heap = BinaryHeap::new();
        for (item, priority) in [('d', 4), ('a', 1), ('e', 5), ('c', 3), ('b', 2)] {
            heap.insert(item, priority);
            heap.check_invariants();
        }
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek_min(), Some((&'a', &1)));
        assert_eq!(drain(&mut heap), ['a', 'b', 'c', 'd', 'e']);
        assert!(heap.is_empty());
        assert_eq!(heap.extract_min(), None);
    }

    #[test]
    fn equal_priorities_extract_in_insertion_order() {
        let mut heap = BinaryHeap::new();
        for item in 0..10 {
            heap.insert(item, 0.5);
        }
        assert_eq!(drain(&mut heap), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn decrease_key_moves_item_forward() {
        let mut heap = BinaryHeap::new();
        heap.insert("x", 10);
        let y = heap.insert("y", 20);
        heap.insert("z", 30);
        heap.decrease_key(y, 5).unwrap();
        heap.check_invariants();
        assert_eq!(heap.peek_min(), Some((&"y", &5)));

        // A decreased key that ties keeps the original insertion sequence.
        let w = heap.insert("w", 40);
        heap.decrease_key(w, 5).unwrap();
        assert_eq!(drain(&mut heap), ["y", "w", "x", "z"]);
    }

    #[test]
    fn decrease_key_rejects_increase_and_stale_handles() {
        let mut heap = BinaryHeap::new();
        let a = heap.insert('a', 3);
        assert_eq!(heap.decrease_key(a, 3), Err(Error::PriorityIncrease));
        assert_eq!(heap.decrease_key(a, 4), Err(Error::PriorityIncrease));
        assert_eq!(heap.peek_min(), Some((&'a', &3)));

        heap.extract_min();
        assert_eq!(heap.decrease_key(a, 1), Err(Error::StaleHandle));
    }
}
