//! pathgraph-core: adjacency-list graphs with a pluggable shortest-path engine.
//!
//! A [`Graph`] hands out positive vertex identifiers from a slot map and
//! reuses the lowest vacated one first; `0` ([`NO_VERTEX`]) is never a
//! vertex. [`DirectedGraph`] and [`UndirectedGraph`] share one store and
//! differ only in edge symmetry.
//!
//! [`ShortestPaths`] runs Dijkstra (or A* with a heuristic) over a borrowed
//! graph. Edge weights come from a caller-supplied [`Weighting`] and
//! results are written to a [`PathStore`], so the engine never knows how
//! weights or path state are represented. [`SimpleStore`] is the stock
//! array-backed store.

mod error;
mod frontier;
mod graph;
mod iter;
mod shortest_paths;
mod simple;

pub use error::{Error, Result};
pub use frontier::Frontier;
pub use graph::{
    pair_id, Directed, DirectedGraph, Direction, EdgeId, Graph, Undirected, UndirectedGraph,
    VertexId, NO_VERTEX,
};
pub use iter::{Edges, Neighbors, Vertices};
pub use shortest_paths::{
    shortest_path, PathStore, SearchSummary, ShortestPaths, VertexState, Weighting,
    WithHeuristic,
};
pub use simple::{SimpleShortestPaths, SimpleStore, STORE_SLACK};
