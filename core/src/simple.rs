use crate::graph::{Direction, Graph, VertexId, NO_VERTEX};
use crate::shortest_paths::{PathStore, ShortestPaths, Weighting};

/// Extra slots reserved beyond the graph's largest vertex id.
pub const STORE_SLACK: usize = 5;

/// Array-indexed [`PathStore`].
///
/// Pre-sized from the graph it is built for and grown on write, so
/// vertices added later still fit.
#[derive(Debug, Clone, Default)]
pub struct SimpleStore {
    distances: Vec<f64>,
    predecessors: Vec<VertexId>,
}

impl SimpleStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            distances: vec![f64::INFINITY; capacity],
            predecessors: vec![NO_VERTEX; capacity],
        }
    }

    pub fn for_graph<D: Direction>(graph: &Graph<D>) -> Self {
        Self::with_capacity(graph.max_vertex_id() + 1 + STORE_SLACK)
    }

    pub fn capacity(&self) -> usize {
        self.distances.len()
    }

    fn ensure(&mut self, v: VertexId) {
        if v >= self.distances.len() {
            let len = v + 1 + STORE_SLACK;
            self.distances.resize(len, f64::INFINITY);
            self.predecessors.resize(len, NO_VERTEX);
        }
    }
}

impl PathStore for SimpleStore {
    fn reset(&mut self) {
        self.distances.fill(f64::INFINITY);
        self.predecessors.fill(NO_VERTEX);
    }

    fn distance(&self, v: VertexId) -> f64 {
        self.distances.get(v).copied().unwrap_or(f64::INFINITY)
    }

    fn set_distance(&mut self, v: VertexId, distance: f64) {
        self.ensure(v);
        self.distances[v] = distance;
    }

    fn predecessor(&self, v: VertexId) -> VertexId {
        self.predecessors.get(v).copied().unwrap_or(NO_VERTEX)
    }

    fn set_predecessor(&mut self, v: VertexId, u: VertexId) {
        self.ensure(v);
        self.predecessors[v] = u;
    }
}

/// Shortest paths recorded in a [`SimpleStore`]: the caller only supplies
/// the [`Weighting`].
pub type SimpleShortestPaths<'g, D, W> = ShortestPaths<'g, D, W, SimpleStore>;

impl<'g, D, W> ShortestPaths<'g, D, W, SimpleStore>
where
    D: Direction,
    W: Weighting,
{
    /// Paths from `source` in `graph`, stored in a [`SimpleStore`] sized
    /// for the graph.
    pub fn simple(graph: &'g Graph<D>, source: VertexId, weights: W) -> Self {
        Self::new(graph, source, weights, SimpleStore::for_graph(graph))
    }
}
