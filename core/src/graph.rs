use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::error::{Error, Result};
use crate::iter::{Edges, Neighbors, Vertices};

/// Vertex identifier. Positive, assigned by the graph, reused after removal.
pub type VertexId = usize;

/// Opaque edge key for external bookkeeping (see [`pair_id`]).
pub type EdgeId = u64;

/// The "no vertex" sentinel. Never a present vertex.
pub const NO_VERTEX: VertexId = 0;

/// Adjacency of a present vertex.
///
/// `incoming` is only maintained for directed graphs; an undirected graph
/// stores each edge in both endpoints' `outgoing` lists and answers
/// predecessor queries from there.
#[derive(Debug, Clone, Default)]
pub(crate) struct Adjacency {
    outgoing: Vec<VertexId>,
    incoming: Vec<VertexId>,
}

/// One entry of the slot map. Slot 0 is permanently vacant.
#[derive(Debug, Clone, Default)]
pub(crate) enum Slot {
    #[default]
    Vacant,
    Occupied(Adjacency),
}

impl Slot {
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }

    pub(crate) fn successors(&self) -> &[VertexId] {
        match self {
            Slot::Occupied(adj) => &adj.outgoing,
            Slot::Vacant => &[],
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Directed {}
    impl Sealed for super::Undirected {}
}

/// Edge symmetry of a [`Graph`].
///
/// The two implementors differ only in whether an edge `(u, v)` also makes
/// `u` a successor of `v`, and in whether predecessors are a separate view.
pub trait Direction: sealed::Sealed + Copy + Default + fmt::Debug + 'static {
    const DIRECTED: bool;
}

/// Arcs have orientation: `(u, v)` and `(v, u)` are distinct edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directed;

/// Edges are symmetric: successors and predecessors are the same view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Undirected;

impl Direction for Directed {
    const DIRECTED: bool = true;
}

impl Direction for Undirected {
    const DIRECTED: bool = false;
}

pub type DirectedGraph = Graph<Directed>;
pub type UndirectedGraph = Graph<Undirected>;

/// Deterministic pairing of two vertex identifiers into an [`EdgeId`].
///
/// `v + (1 + u + v) * (u + v)`, computed with wrapping arithmetic. The
/// result is only an opaque key; the graph never looks anything up by it.
pub fn pair_id(u: VertexId, v: VertexId) -> EdgeId {
    let (u, v) = (u as u64, v as u64);
    let sum = u.wrapping_add(v);
    v.wrapping_add(sum.wrapping_add(1).wrapping_mul(sum))
}

/// Adjacency-list graph over densely packed positive vertex identifiers.
///
/// Vertices live in a slot map: a growable array of slots plus a free list
/// of vacated identifiers. `add_vertex` hands out the lowest vacated
/// identifier before extending the array. Removal scans every adjacency
/// list, so it costs O(V + E).
pub struct Graph<D: Direction> {
    slots: Vec<Slot>,
    free: BinaryHeap<Reverse<VertexId>>,
    vertex_count: usize,
    direction: PhantomData<D>,
}

impl<D: Direction> Graph<D> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-allocate for a known number of vertices.
    pub fn with_capacity(vertices: usize) -> Self {
        let mut slots = Vec::with_capacity(vertices + 1);
        slots.push(Slot::Vacant);
        Self {
            slots,
            free: BinaryHeap::new(),
            vertex_count: 0,
            direction: PhantomData,
        }
    }

    pub fn is_directed(&self) -> bool {
        D::DIRECTED
    }

    fn adjacency(&self, v: VertexId) -> Option<&Adjacency> {
        match self.slots.get(v) {
            Some(Slot::Occupied(adj)) => Some(adj),
            _ => None,
        }
    }

    fn adjacency_mut(&mut self, v: VertexId) -> Result<&mut Adjacency> {
        match self.slots.get_mut(v) {
            Some(Slot::Occupied(adj)) => Ok(adj),
            _ => Err(Error::InvalidVertex(v)),
        }
    }

    fn require(&self, v: VertexId) -> Result<()> {
        if self.contains(v) {
            Ok(())
        } else {
            Err(Error::InvalidVertex(v))
        }
    }

    /// Add a vertex and return its identifier: the lowest free identifier,
    /// or a new maximum if none is free.
    pub fn add_vertex(&mut self) -> VertexId {
        let id = match self.free.pop() {
            Some(Reverse(id)) => {
                self.slots[id] = Slot::Occupied(Adjacency::default());
                id
            }
            None => {
                self.slots.push(Slot::Occupied(Adjacency::default()));
                self.slots.len() - 1
            }
        };
        self.vertex_count += 1;
        id
    }

    /// Add the edge `(u, v)` and return its [`EdgeId`].
    ///
    /// Adding an edge that already exists changes nothing. For undirected
    /// graphs `v` also becomes adjacent to `u`.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> Result<EdgeId> {
        self.require(u)?;
        self.require(v)?;

        if self.contains_edge(u, v) {
            return Ok(self.edge_id(u, v));
        }

        self.adjacency_mut(u)?.outgoing.push(v);
        let target = self.adjacency_mut(v)?;
        if D::DIRECTED {
            target.incoming.push(u);
        } else if !target.outgoing.contains(&u) {
            target.outgoing.push(u);
        }

        Ok(self.edge_id(u, v))
    }

    /// Remove `v` and every edge touching it. Its identifier becomes free
    /// for reuse. Returns false if `v` was not present.
    pub fn remove_vertex(&mut self, v: VertexId) -> bool {
        if !self.contains(v) {
            return false;
        }

        self.slots[v] = Slot::Vacant;
        self.free.push(Reverse(v));
        self.vertex_count -= 1;

        let mut dropped = 0usize;
        for slot in &mut self.slots {
            if let Slot::Occupied(adj) = slot {
                let before = adj.outgoing.len() + adj.incoming.len();
                adj.outgoing.retain(|&w| w != v);
                adj.incoming.retain(|&w| w != v);
                dropped += before - adj.outgoing.len() - adj.incoming.len();
            }
        }

        debug!(vertex = v, adjacency_entries_dropped = dropped, "removed vertex");
        true
    }

    /// Remove one occurrence of the edge `(u, v)`.
    ///
    /// Both endpoints must be present. Returns whether an edge was removed.
    pub fn remove_edge(&mut self, u: VertexId, v: VertexId) -> Result<bool> {
        self.require(u)?;
        self.require(v)?;

        if !remove_first(&mut self.adjacency_mut(u)?.outgoing, v) {
            return Ok(false);
        }

        let target = self.adjacency_mut(v)?;
        if D::DIRECTED {
            remove_first(&mut target.incoming, u);
        } else if u != v {
            remove_first(&mut target.outgoing, u);
        }
        Ok(true)
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.adjacency(v).is_some()
    }

    /// True if `v` is a successor of `u`. False for unknown vertices.
    pub fn contains_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.contains(v)
            && self
                .adjacency(u)
                .is_some_and(|adj| adj.outgoing.contains(&v))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Largest present identifier, or [`NO_VERTEX`] for an empty graph.
    pub fn max_vertex_id(&self) -> VertexId {
        self.slots
            .iter()
            .rposition(Slot::is_occupied)
            .unwrap_or(NO_VERTEX)
    }

    /// Directed: number of arcs. Undirected: unordered pairs plus self-loops.
    pub fn edge_count(&self) -> usize {
        if D::DIRECTED {
            self.slots.iter().map(|s| s.successors().len()).sum()
        } else {
            self.edges().count()
        }
    }

    pub fn out_degree(&self, v: VertexId) -> usize {
        self.adjacency(v).map_or(0, |adj| adj.outgoing.len())
    }

    pub fn in_degree(&self, v: VertexId) -> usize {
        self.adjacency(v).map_or(0, |adj| incoming::<D>(adj).len())
    }

    pub fn vertices(&self) -> Vertices<'_> {
        Vertices::new(&self.slots)
    }

    /// Successors of `v`; empty for absent vertices.
    pub fn successors(&self, v: VertexId) -> Neighbors<'_> {
        self.adjacency(v)
            .map_or_else(Neighbors::empty, |adj| Neighbors::new(&adj.outgoing))
    }

    /// Predecessors of `v`; identical to [`successors`](Self::successors)
    /// for undirected graphs, empty for absent vertices.
    pub fn predecessors(&self, v: VertexId) -> Neighbors<'_> {
        self.adjacency(v)
            .map_or_else(Neighbors::empty, |adj| Neighbors::new(incoming::<D>(adj)))
    }

    /// The `k`-th successor of `v`.
    ///
    /// Returns [`NO_VERTEX`] when `v` is absent or has no successors at
    /// all; an index past a non-empty list is an error.
    pub fn successor_at(&self, v: VertexId, k: usize) -> Result<VertexId> {
        match self.adjacency(v) {
            Some(adj) => positional(v, &adj.outgoing, k),
            None => Ok(NO_VERTEX),
        }
    }

    /// The `k`-th predecessor of `v`, with the same conventions as
    /// [`successor_at`](Self::successor_at).
    pub fn predecessor_at(&self, v: VertexId, k: usize) -> Result<VertexId> {
        match self.adjacency(v) {
            Some(adj) => positional(v, incoming::<D>(adj), k),
            None => Ok(NO_VERTEX),
        }
    }

    pub fn edges(&self) -> Edges<'_> {
        Edges::new(&self.slots, D::DIRECTED)
    }

    /// [`pair_id`] of `(u, v)`, with the endpoints ordered for undirected
    /// graphs so both orientations agree. 0 if `(u, v)` is not an edge.
    pub fn edge_id(&self, u: VertexId, v: VertexId) -> EdgeId {
        if !self.contains_edge(u, v) {
            return 0;
        }
        if D::DIRECTED || u <= v {
            pair_id(u, v)
        } else {
            pair_id(v, u)
        }
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let slots_mem = self.slots.capacity() * size_of::<Slot>();
        let lists_mem: usize = self
            .slots
            .iter()
            .filter_map(|s| match s {
                Slot::Occupied(adj) => Some(adj.outgoing.capacity() + adj.incoming.capacity()),
                Slot::Vacant => None,
            })
            .sum::<usize>()
            * size_of::<VertexId>();
        let free_mem = self.free.capacity() * size_of::<VertexId>();

        slots_mem + lists_mem + free_mem
    }
}

impl<D: Direction> Default for Graph<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Direction> fmt::Debug for Graph<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("directed", &D::DIRECTED)
            .field("vertex_count", &self.vertex_count)
            .field("max_vertex_id", &self.max_vertex_id())
            .finish()
    }
}

fn incoming<D: Direction>(adj: &Adjacency) -> &[VertexId] {
    if D::DIRECTED {
        &adj.incoming
    } else {
        &adj.outgoing
    }
}

fn positional(vertex: VertexId, list: &[VertexId], index: usize) -> Result<VertexId> {
    if list.is_empty() {
        return Ok(NO_VERTEX);
    }
    list.get(index).copied().ok_or(Error::IndexOutOfRange {
        vertex,
        index,
        len: list.len(),
    })
}

fn remove_first(list: &mut Vec<VertexId>, v: VertexId) -> bool {
    match list.iter().position(|&w| w == v) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}
