pub mod binary;
pub mod fibonacci;

use core::cmp::Ordering;

pub use self::binary::BinaryHeap;
pub use self::fibonacci::FibonacciHeap;
use crate::error::Error;

/// Identifies an inserted item for later `decrease_key` calls.
///
/// Handles are issued in insertion order, which is also the tie-break order for equal priorities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(usize);

impl Handle {
    pub(crate) fn new(seq: usize) -> Self {
        Self(seq)
    }

    pub(crate) fn seq(self) -> usize {
        self.0
    }
}

/// The min-priority queue used to pick the cheapest frontier actor next.
///
/// Implementations must order items by priority and break ties by insertion order (first
/// inserted wins), so that any sequence of operations replayed against two implementations yields
/// the same extraction order.
pub trait PriorityQueue {
    type Item;
    type Priority;

    /// Adds an item and returns a handle usable with `decrease_key`.
    fn insert(&mut self, item: Self::Item, priority: Self::Priority) -> Handle;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn peek_min(&self) -> Option<(&Self::Item, &Self::Priority)>;

    fn extract_min(&mut self) -> Option<(Self::Item, Self::Priority)>;

    /// Lowers the priority of a queued item. The new priority must be strictly smaller.
    fn decrease_key(&mut self, handle: Handle, priority: Self::Priority) -> Result<(), Error>;
}

/// Total order over (priority, insertion sequence) shared by both backends.
pub(crate) fn precedes<P: PartialOrd>(a: (&P, usize), b: (&P, usize)) -> bool {
    match a.0.partial_cmp(b.0) {
        Some(Ordering::Less) => true,
        Some(Ordering::Greater) => false,
        _ => a.1 < b.1,
    }
}

pub(crate) fn check_decrease<P: PartialOrd>(current: &P, new: &P) -> Result<(), Error> {
    match new.partial_cmp(current) {
        Some(Ordering::Less) => Ok(()),
        _ => Err(Error::PriorityIncrease),
    }
}
