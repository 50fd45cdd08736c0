//! Fibonacci heap kept in a single arena.
//!
//! Nodes are never freed while the heap is alive: an extracted node keeps its slot with `item`
//! set to `None`, so a node's arena index doubles as its handle and its insertion sequence.
//! Parent, child and sibling links are indices into the arena; every sibling ring (including the
//! root ring) is a circular doubly-linked list threaded through `left`/`right`.

use alloc::{vec, vec::Vec};
use core::mem;

use crate::error::Error;
use crate::heap::{check_decrease, precedes, Handle, PriorityQueue};

struct Node<T, P> {
    item: Option<T>,
    priority: P,
    parent: Option<usize>,
    child: Option<usize>,
    left: usize,
    right: usize,
    degree: usize,
    marked: bool,
}

/// Fibonacci heap: O(1) amortized insert and decrease-key, O(log n) amortized extract-min.
pub struct FibonacciHeap<T, P> {
    nodes: Vec<Node<T, P>>,
    min: Option<usize>,
    len: usize,
}

impl<T, P> Default for FibonacciHeap<T, P> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            min: None,
            len: 0,
        }
    }
}

/// Upper bound on the degree of any node in a heap of `n` nodes.
///
/// A node of degree `k` roots a subtree of at least `F(k + 2)` nodes, so the bound is the largest
/// `k` with `F(k + 2) <= n`.
fn max_degree(n: usize) -> usize {
    let (mut k, mut fib, mut next) = (0, 1usize, 2usize); // F(2), F(3)
    while next <= n {
        k += 1;
        let sum = fib.saturating_add(next);
        fib = next;
        next = sum;
    }
    k
}

impl<T, P: PartialOrd> FibonacciHeap<T, P> {
    pub fn new() -> Self {
        Self::default()
    }

    fn precedes(&self, a: usize, b: usize) -> bool {
        precedes((&self.nodes[a].priority, a), (&self.nodes[b].priority, b))
    }

    fn is_queued(&self, x: usize) -> bool {
        self.nodes.get(x).map_or(false, |n| n.item.is_some())
    }

    /// Splices the single node `x` into the ring right of `anchor`.
    fn splice_after(&mut self, anchor: usize, x: usize) {
        let right = self.nodes[anchor].right;
        self.nodes[x].left = anchor;
        self.nodes[x].right = right;
        self.nodes[anchor].right = x;
        self.nodes[right].left = x;
    }

    /// Removes `x` from whatever ring it is in, leaving it as a ring of one.
    fn unlink(&mut self, x: usize) {
        let (left, right) = (self.nodes[x].left, self.nodes[x].right);
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        self.nodes[x].left = x;
        self.nodes[x].right = x;
    }

    fn ring(&self, start: usize) -> Vec<usize> {
        let mut members = vec![start];
        let mut cur = self.nodes[start].right;
        while cur != start {
            members.push(cur);
            cur = self.nodes[cur].right;
        }
        members
    }

    fn add_root(&mut self, x: usize) {
        self.nodes[x].parent = None;
        self.nodes[x].marked = false;
        match self.min {
            Some(min) => {
                self.splice_after(min, x);
                if self.precedes(x, min) {
                    self.min = Some(x);
                }
            }
            None => self.min = Some(x),
        }
    }

    /// Makes root `y` a child of root `x`.
    fn link(&mut self, y: usize, x: usize) {
        self.unlink(y);
        match self.nodes[x].child {
            Some(child) => self.splice_after(child, y),
            None => self.nodes[x].child = Some(y),
        }
        self.nodes[y].parent = Some(x);
        self.nodes[y].marked = false;
        self.nodes[x].degree += 1;
    }

    /// Moves `x` from the child ring of `parent` to the root ring.
    fn cut(&mut self, x: usize, parent: usize) {
        if self.nodes[parent].child == Some(x) {
            let sibling = self.nodes[x].right;
            self.nodes[parent].child = (sibling != x).then_some(sibling);
        }
        self.unlink(x);
        self.nodes[parent].degree -= 1;
        self.add_root(x);
    }

    fn cascading_cut(&mut self, mut y: usize) {
        while let Some(parent) = self.nodes[y].parent {
            if !self.nodes[y].marked {
                self.nodes[y].marked = true;
                return;
            }
            self.cut(y, parent);
            y = parent;
        }
    }

    /// Merges equal-degree roots until all root degrees are distinct, then recomputes `min`.
    fn consolidate(&mut self, start: usize) {
        let mut by_degree: Vec<Option<usize>> = vec![None; max_degree(self.len) + 1];

        for root in self.ring(start) {
            let mut x = root;
            let mut d = self.nodes[x].degree;
            loop {
                if d >= by_degree.len() {
                    by_degree.resize(d + 1, None);
                }
                let Some(mut y) = by_degree[d].take() else {
                    break;
                };
                if self.precedes(y, x) {
                    mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                d += 1;
            }
            by_degree[d] = Some(x);
        }

        self.min = None;
        for root in by_degree.into_iter().flatten() {
            match self.min {
                Some(min) if !self.precedes(root, min) => {}
                _ => self.min = Some(root),
            }
        }
    }
}

impl<T, P: PartialOrd + Copy> PriorityQueue for FibonacciHeap<T, P> {
    type Item = T;
    type Priority = P;

    fn insert(&mut self, item: T, priority: P) -> Handle {
        let x = self.nodes.len();
        self.nodes.push(Node {
            item: Some(item),
            priority,
            parent: None,
            child: None,
            left: x,
            right: x,
            degree: 0,
            marked: false,
        });
        self.add_root(x);
        self.len += 1;
        Handle::new(x)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn peek_min(&self) -> Option<(&T, &P)> {
        let node = &self.nodes[self.min?];
        node.item.as_ref().map(|item| (item, &node.priority))
    }

    fn extract_min(&mut self) -> Option<(T, P)> {
        let z = self.min?;

        if let Some(child) = self.nodes[z].child.take() {
            for x in self.ring(child) {
                self.unlink(x);
                self.nodes[x].parent = None;
                self.nodes[x].marked = false;
                self.splice_after(z, x);
            }
            self.nodes[z].degree = 0;
        }

        let next = self.nodes[z].right;
        self.unlink(z);
        self.len -= 1;
        if next == z {
            self.min = None;
        } else {
            self.min = Some(next);
            self.consolidate(next);
        }

        let node = &mut self.nodes[z];
        node.item.take().map(|item| (item, node.priority))
    }

    fn decrease_key(&mut self, handle: Handle, priority: P) -> Result<(), Error> {
        let x = handle.seq();
        if !self.is_queued(x) {
            return Err(Error::StaleHandle);
        }
        check_decrease(&self.nodes[x].priority, &priority)?;
        self.nodes[x].priority = priority;

        if let Some(parent) = self.nodes[x].parent {
            if self.precedes(x, parent) {
                self.cut(x, parent);
                self.cascading_cut(parent);
            }
        }
        if let Some(min) = self.min {
            if self.precedes(x, min) {
                self.min = Some(x);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn fibonacci(k: usize) -> usize {
    let (mut a, mut b) = (0, 1);
    for _ in 0..k {
        let sum = a + b;
        a = b;
        b = sum;
    }
    a
}

#[cfg(test)]
impl<T, P: PartialOrd> FibonacciHeap<T, P> {
    /// Walks every tree and asserts ring, parent, degree, heap-order and size invariants.
    pub(crate) fn check_invariants(&self) {
        let Some(min) = self.min else {
            assert_eq!(self.len, 0);
            return;
        };
        let mut total = 0;
        for root in self.ring(min) {
            assert!(self.is_queued(root));
            assert_eq!(self.nodes[root].parent, None);
            assert!(!self.precedes(root, min), "min is not the smallest root");
            total += self.check_subtree(root);
        }
        assert_eq!(total, self.len);
        let queued = (0..self.nodes.len()).filter(|&x| self.is_queued(x)).count();
        assert_eq!(queued, self.len);
    }

    fn check_subtree(&self, x: usize) -> usize {
        let node = &self.nodes[x];
        assert_eq!(self.nodes[node.left].right, x);
        assert_eq!(self.nodes[node.right].left, x);

        let mut size = 1;
        let mut degree = 0;
        if let Some(child) = node.child {
            for c in self.ring(child) {
                assert!(self.is_queued(c));
                assert_eq!(self.nodes[c].parent, Some(x));
                assert!(!self.precedes(c, x), "heap order violated below {x}");
                size += self.check_subtree(c);
                degree += 1;
            }
        }
        assert_eq!(degree, node.degree);
        assert!(
            size >= fibonacci(degree + 2),
            "subtree of degree {degree} has only {size} nodes"
        );
        size
    }

    pub(crate) fn root_count(&self) -> usize {
        self.min.map_or(0, |min| self.ring(min).len())
    }
}
