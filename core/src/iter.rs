//! Lazy, single-pass views over a [`Graph`](crate::Graph).
//!
//! Every sequence here borrows the graph and yields identifiers on demand
//! instead of materialising a container. They are finite and cannot be
//! rewound: iterating again means asking the graph for a fresh sequence.

use std::iter::FusedIterator;
use std::slice;

use crate::graph::{Slot, VertexId};

/// Successors or predecessors of one vertex, in insertion order.
#[derive(Debug)]
pub struct Neighbors<'a> {
    inner: slice::Iter<'a, VertexId>,
}

impl<'a> Neighbors<'a> {
    pub(crate) fn new(list: &'a [VertexId]) -> Self {
        Self { inner: list.iter() }
    }

    /// The sequence handed out for absent or unknown vertices.
    pub(crate) fn empty() -> Self {
        Self::new(&[])
    }
}

impl Iterator for Neighbors<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Neighbors<'_> {}
impl FusedIterator for Neighbors<'_> {}

/// Present vertex identifiers in ascending order.
#[derive(Debug)]
pub struct Vertices<'a> {
    inner: std::iter::Enumerate<slice::Iter<'a, Slot>>,
}

impl<'a> Vertices<'a> {
    pub(crate) fn new(slots: &'a [Slot]) -> Self {
        Self {
            inner: slots.iter().enumerate(),
        }
    }
}

impl Iterator for Vertices<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        self.inner
            .by_ref()
            .find(|(_, slot)| slot.is_occupied())
            .map(|(id, _)| id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl FusedIterator for Vertices<'_> {}

/// Edges as `(u, v)` pairs.
///
/// Directed graphs yield every stored arc. Undirected graphs store each
/// edge in both endpoints' lists, so only the `u <= v` copy is yielded:
/// one pair per unordered edge, self-loops once.
#[derive(Debug)]
pub struct Edges<'a> {
    slots: &'a [Slot],
    directed: bool,
    current: VertexId,
    targets: slice::Iter<'a, VertexId>,
}

impl<'a> Edges<'a> {
    pub(crate) fn new(slots: &'a [Slot], directed: bool) -> Self {
        Self {
            slots,
            directed,
            current: 0,
            targets: [].iter(),
        }
    }
}

impl Iterator for Edges<'_> {
    type Item = (VertexId, VertexId);

    fn next(&mut self) -> Option<(VertexId, VertexId)> {
        loop {
            for &v in self.targets.by_ref() {
                if self.directed || self.current <= v {
                    return Some((self.current, v));
                }
            }

            // Advance to the next occupied slot.
            let next = (self.current + 1..self.slots.len())
                .find(|&id| self.slots[id].is_occupied())?;
            self.current = next;
            self.targets = self.slots[next].successors().iter();
        }
    }
}

impl FusedIterator for Edges<'_> {}
