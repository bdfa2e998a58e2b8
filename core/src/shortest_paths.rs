use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::frontier::Frontier;
use crate::graph::{Direction, Graph, VertexId, NO_VERTEX};
use crate::simple::SimpleStore;

/// Edge weights, and optionally an A* estimate, supplied by the caller.
///
/// This is where a domain payload (a road length, a cost attached to an
/// edge id) is turned into a number; the engine never sees the payload.
pub trait Weighting {
    /// Weight of the edge `(u, v)`, or `f64::INFINITY` if there is no such
    /// edge. Must not be negative.
    fn edge_weight(&self, u: VertexId, v: VertexId) -> f64;

    /// Estimated remaining distance from `v` to the destination.
    ///
    /// Zero by default, which makes the search plain Dijkstra. A* results
    /// are only exact if the estimate never exceeds the true distance.
    fn heuristic(&self, _v: VertexId) -> f64 {
        0.0
    }
}

impl<F> Weighting for F
where
    F: Fn(VertexId, VertexId) -> f64,
{
    fn edge_weight(&self, u: VertexId, v: VertexId) -> f64 {
        self(u, v)
    }
}

/// Pairs an edge-weight function with a heuristic function.
#[derive(Debug, Clone)]
pub struct WithHeuristic<W, H> {
    pub weights: W,
    pub heuristic: H,
}

impl<W, H> WithHeuristic<W, H> {
    pub fn new(weights: W, heuristic: H) -> Self {
        Self { weights, heuristic }
    }
}

impl<W, H> Weighting for WithHeuristic<W, H>
where
    W: Weighting,
    H: Fn(VertexId) -> f64,
{
    fn edge_weight(&self, u: VertexId, v: VertexId) -> f64 {
        self.weights.edge_weight(u, v)
    }

    fn heuristic(&self, v: VertexId) -> f64 {
        (self.heuristic)(v)
    }
}

/// Distance and predecessor bookkeeping written by a search.
///
/// Unset distances read as `f64::INFINITY`, unset predecessors as
/// [`NO_VERTEX`].
pub trait PathStore {
    /// Forget everything recorded by a previous search.
    fn reset(&mut self);

    fn distance(&self, v: VertexId) -> f64;

    fn set_distance(&mut self, v: VertexId, distance: f64);

    fn predecessor(&self, v: VertexId) -> VertexId;

    fn set_predecessor(&mut self, v: VertexId, u: VertexId);
}

/// Where a vertex stands in the current search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VertexState {
    #[default]
    Unvisited,
    Frontier,
    Settled,
}

/// Outcome counters of one [`ShortestPaths::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Vertices extracted from the frontier.
    pub settled: usize,
    /// Settled vertices put back on the frontier because a shorter path
    /// turned up. Only an inconsistent heuristic can cause this.
    pub reopened: usize,
    /// The search stopped because the destination was settled.
    pub reached_destination: bool,
}

/// Single-source shortest paths over a borrowed graph (Dijkstra, or A*
/// when the weighting supplies a heuristic).
///
/// The search writes into a [`PathStore`]; [`run`](Self::run) may be
/// called again to recompute from scratch. The graph is borrowed for the
/// engine's lifetime, so results can never go stale under mutation: drop
/// the engine, change the graph, and build a new one.
pub struct ShortestPaths<'g, D: Direction, W, S = SimpleStore> {
    graph: &'g Graph<D>,
    source: VertexId,
    destination: Option<VertexId>,
    weights: W,
    store: S,
    frontier: Frontier,
    states: Vec<VertexState>,
}

impl<'g, D, W, S> ShortestPaths<'g, D, W, S>
where
    D: Direction,
    W: Weighting,
    S: PathStore,
{
    /// Paths from `source` to every vertex, recorded in `store`.
    pub fn new(graph: &'g Graph<D>, source: VertexId, weights: W, store: S) -> Self {
        Self {
            graph,
            source,
            destination: None,
            weights,
            store,
            frontier: Frontier::with_capacity(graph.max_vertex_id() + 1),
            states: Vec::new(),
        }
    }

    /// Stop the search as soon as `destination` is settled.
    pub fn to(mut self, destination: VertexId) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn destination(&self) -> Option<VertexId> {
        self.destination
    }

    pub fn graph(&self) -> &'g Graph<D> {
        self.graph
    }

    pub fn weights(&self) -> &W {
        &self.weights
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the search, replacing the results of any earlier run.
    ///
    /// Fails with [`Error::InvalidVertex`] if the source, or a destination
    /// that was set, is not in the graph.
    pub fn run(&mut self) -> Result<SearchSummary> {
        let graph = self.graph;
        if !graph.contains(self.source) {
            return Err(Error::InvalidVertex(self.source));
        }
        if let Some(dest) = self.destination {
            if !graph.contains(dest) {
                return Err(Error::InvalidVertex(dest));
            }
        }

        debug!(
            source = self.source,
            destination = ?self.destination,
            vertices = graph.vertex_count(),
            "shortest-path search started"
        );

        self.store.reset();
        self.frontier.clear();
        self.states.clear();
        self.states
            .resize(graph.max_vertex_id() + 1, VertexState::Unvisited);

        for v in graph.vertices() {
            let distance = if v == self.source { 0.0 } else { f64::INFINITY };
            self.store.set_distance(v, distance);
            self.store.set_predecessor(v, NO_VERTEX);
            self.frontier
                .decrease_key_or_insert(v, distance + self.weights.heuristic(v));
            self.states[v] = VertexState::Frontier;
        }

        let mut summary = SearchSummary::default();
        while let Some((u, _)) = self.frontier.pop() {
            let du = self.store.distance(u);
            self.states[u] = VertexState::Settled;
            summary.settled += 1;
            trace!(vertex = u, distance = du, "settled");

            // Unreachable: nothing to relax, and it can never be the
            // destination that stops the search.
            if du == f64::INFINITY {
                continue;
            }

            if self.destination == Some(u) {
                summary.reached_destination = true;
                break;
            }

            for w in graph.successors(u) {
                let candidate = du + self.weights.edge_weight(u, w);
                if candidate < self.store.distance(w) {
                    trace!(from = u, to = w, distance = candidate, "relaxed");
                    self.store.set_distance(w, candidate);
                    self.store.set_predecessor(w, u);
                    if self.states[w] == VertexState::Settled {
                        summary.reopened += 1;
                    }
                    self.states[w] = VertexState::Frontier;
                    self.frontier
                        .decrease_key_or_insert(w, candidate + self.weights.heuristic(w));
                }
            }
        }

        debug!(
            settled = summary.settled,
            reopened = summary.reopened,
            reached_destination = summary.reached_destination,
            "shortest-path search finished"
        );
        Ok(summary)
    }

    /// Best known distance from the source; infinite for unreached or
    /// unknown vertices.
    pub fn distance(&self, v: VertexId) -> f64 {
        if self.graph.contains(v) {
            self.store.distance(v)
        } else {
            f64::INFINITY
        }
    }

    /// Best known predecessor of `v`, or [`NO_VERTEX`].
    pub fn predecessor_of(&self, v: VertexId) -> VertexId {
        if self.graph.contains(v) {
            self.store.predecessor(v)
        } else {
            NO_VERTEX
        }
    }

    pub fn state(&self, v: VertexId) -> VertexState {
        self.states.get(v).copied().unwrap_or_default()
    }

    /// Vertices on the best known path from the source to `v`, both included.
    ///
    /// Fails with [`Error::UnreachableDestination`] if `v` has no finite
    /// distance, including when the search has not been run.
    pub fn path_to(&self, v: VertexId) -> Result<Vec<VertexId>> {
        if self.distance(v) == f64::INFINITY {
            return Err(Error::UnreachableDestination(v));
        }

        let mut path = vec![v];
        let mut current = v;
        while current != self.source {
            let prev = self.store.predecessor(current);
            // A broken chain or one longer than the graph means the store
            // does not describe a path back to the source.
            if prev == NO_VERTEX || path.len() > self.graph.vertex_count() {
                return Err(Error::UnreachableDestination(v));
            }
            path.push(prev);
            current = prev;
        }

        path.reverse();
        Ok(path)
    }

    /// [`path_to`](Self::path_to) the destination given with [`to`](Self::to).
    pub fn path(&self) -> Result<Vec<VertexId>> {
        let dest = self.destination.ok_or(Error::NoDestinationSpecified)?;
        self.path_to(dest)
    }
}

/// Shortest path from `source` to `destination` with a [`SimpleStore`].
///
/// Returns the distance and the path including both endpoints.
pub fn shortest_path<D, W>(
    graph: &Graph<D>,
    source: VertexId,
    destination: VertexId,
    weights: W,
) -> Result<(f64, Vec<VertexId>)>
where
    D: Direction,
    W: Weighting,
{
    let mut search = ShortestPaths::simple(graph, source, weights).to(destination);
    search.run()?;
    let path = search.path()?;
    Ok((search.distance(destination), path))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::graph::{DirectedGraph, UndirectedGraph};

    type Table = HashMap<(VertexId, VertexId), f64>;

    fn lookup(table: &Table) -> impl Fn(VertexId, VertexId) -> f64 + '_ {
        move |u, v| table.get(&(u, v)).copied().unwrap_or(f64::INFINITY)
    }

    fn directed(n: usize, edges: &[(VertexId, VertexId, f64)]) -> (DirectedGraph, Table) {
        let mut g = DirectedGraph::new();
        for _ in 0..n {
            g.add_vertex();
        }
        let mut table = Table::new();
        for &(u, v, w) in edges {
            g.add_edge(u, v).unwrap();
            table.insert((u, v), w);
        }
        (g, table)
    }

    fn undirected(n: usize, edges: &[(VertexId, VertexId, f64)]) -> (UndirectedGraph, Table) {
        let mut g = UndirectedGraph::new();
        for _ in 0..n {
            g.add_vertex();
        }
        let mut table = Table::new();
        for &(u, v, w) in edges {
            g.add_edge(u, v).unwrap();
            table.insert((u, v), w);
            table.insert((v, u), w);
        }
        (g, table)
    }

    /// A --2-- B --1-- D --4-- E, A --10-- C --0-- E (A=1 .. E=5).
    fn make_detour() -> (UndirectedGraph, Table) {
        undirected(
            5,
            &[
                (1, 2, 2.0),
                (1, 3, 10.0),
                (2, 4, 1.0),
                (4, 5, 4.0),
                (3, 5, 0.0),
            ],
        )
    }

    /// Four-vertex diamond with a cheap and an expensive branch.
    fn make_diamond() -> (DirectedGraph, Table) {
        directed(
            4,
            &[(1, 2, 1.0), (1, 3, 5.0), (2, 4, 1.0), (3, 4, 1.0)],
        )
    }

    fn make_chain(n: usize) -> (DirectedGraph, Table) {
        let edges: Vec<_> = (1..n).map(|i| (i, i + 1, 1.0)).collect();
        directed(n, &edges)
    }

    // --- Dijkstra tests ---

    #[test]
    fn test_full_tree_distances() {
        let (g, t) = make_detour();
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t));
        let summary = sp.run().unwrap();
        assert_eq!(summary.settled, 5);
        assert!(!summary.reached_destination);
        assert_eq!(sp.distance(1), 0.0);
        assert_eq!(sp.distance(2), 2.0);
        assert_eq!(sp.distance(4), 3.0);
        assert_eq!(sp.distance(5), 7.0);
        assert_eq!(sp.distance(3), 7.0);
        assert_eq!(sp.predecessor_of(3), 5);
        assert_eq!(sp.predecessor_of(1), NO_VERTEX);
    }

    #[test]
    fn test_path_reconstruction() {
        let (g, t) = make_detour();
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t)).to(5);
        sp.run().unwrap();
        assert_eq!(sp.path().unwrap(), vec![1, 2, 4, 5]);
        assert_eq!(sp.path_to(5).unwrap(), vec![1, 2, 4, 5]);
        assert_eq!(sp.path_to(1).unwrap(), vec![1]);
    }

    #[test]
    fn test_diamond_prefers_cheap_branch() {
        let (g, t) = make_diamond();
        let (dist, path) = shortest_path(&g, 1, 4, lookup(&t)).unwrap();
        assert_eq!(dist, 2.0);
        assert_eq!(path, vec![1, 2, 4]);
    }

    #[test]
    fn test_directed_respects_orientation() {
        let (g, t) = make_chain(4);
        let mut sp = ShortestPaths::simple(&g, 3, lookup(&t));
        sp.run().unwrap();
        assert_eq!(sp.distance(4), 1.0);
        assert_eq!(sp.distance(1), f64::INFINITY);
        assert_eq!(sp.path_to(1), Err(Error::UnreachableDestination(1)));
    }

    #[test]
    fn test_unreachable_destination() {
        let (g, t) = directed(3, &[(1, 2, 1.0)]);
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t)).to(3);
        let summary = sp.run().unwrap();
        assert!(!summary.reached_destination);
        assert_eq!(summary.settled, 3);
        assert_eq!(sp.path(), Err(Error::UnreachableDestination(3)));
        assert_eq!(shortest_path(&g, 1, 3, lookup(&t)), Err(Error::UnreachableDestination(3)));
    }

    #[test]
    fn test_no_destination_specified() {
        let (g, t) = make_chain(3);
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t));
        sp.run().unwrap();
        assert_eq!(sp.path(), Err(Error::NoDestinationSpecified));
    }

    #[test]
    fn test_path_before_run_is_unreachable() {
        let (g, t) = make_chain(3);
        let sp = ShortestPaths::simple(&g, 1, lookup(&t)).to(3);
        assert_eq!(sp.path(), Err(Error::UnreachableDestination(3)));
        assert_eq!(sp.state(1), VertexState::Unvisited);
    }

    #[test]
    fn test_invalid_source_and_destination() {
        let (g, t) = make_chain(3);
        let mut sp = ShortestPaths::simple(&g, 9, lookup(&t));
        assert_eq!(sp.run(), Err(Error::InvalidVertex(9)));
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t)).to(0);
        assert_eq!(sp.run(), Err(Error::InvalidVertex(0)));
    }

    #[test]
    fn test_unknown_vertex_queries() {
        let (g, t) = make_chain(3);
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t));
        sp.run().unwrap();
        assert_eq!(sp.distance(42), f64::INFINITY);
        assert_eq!(sp.predecessor_of(42), NO_VERTEX);
        assert_eq!(sp.state(42), VertexState::Unvisited);
    }

    #[test]
    fn test_full_search_settles_unreachable() {
        let (g, t) = directed(3, &[(1, 2, 1.0)]);
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t));
        let summary = sp.run().unwrap();
        assert_eq!(summary.settled, 3);
        assert!(!summary.reached_destination);
        for v in 1..=3 {
            assert_eq!(sp.state(v), VertexState::Settled);
        }
        assert_eq!(sp.distance(3), f64::INFINITY);
        assert_eq!(sp.predecessor_of(3), NO_VERTEX);
    }

    #[test]
    fn test_destination_stops_early() {
        let (g, t) = make_chain(10);
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t)).to(3);
        let summary = sp.run().unwrap();
        assert!(summary.reached_destination);
        assert_eq!(summary.settled, 3);
        assert_eq!(sp.state(3), VertexState::Settled);
        assert_eq!(sp.state(4), VertexState::Frontier);
        assert_eq!(sp.path().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_source_is_destination() {
        let (g, t) = make_chain(3);
        let (dist, path) = shortest_path(&g, 2, 2, lookup(&t)).unwrap();
        assert_eq!(dist, 0.0);
        assert_eq!(path, vec![2]);
    }

    #[test]
    fn test_self_loop_ignored() {
        let (g, t) = directed(2, &[(1, 1, 0.0), (1, 2, 3.0)]);
        let (dist, path) = shortest_path(&g, 1, 2, lookup(&t)).unwrap();
        assert_eq!(dist, 3.0);
        assert_eq!(path, vec![1, 2]);
    }

    #[test]
    fn test_ties_prefer_smaller_vertex() {
        // Two equal-cost routes to 4; the one through 2 is settled first.
        let (g, t) = directed(4, &[(1, 3, 1.0), (1, 2, 1.0), (3, 4, 1.0), (2, 4, 1.0)]);
        let mut sp = ShortestPaths::simple(&g, 1, lookup(&t));
        sp.run().unwrap();
        assert_eq!(sp.predecessor_of(4), 2);
    }

    #[test]
    fn test_rerun_recomputes_after_removal() {
        let (mut g, t) = directed(4, &[(1, 2, 1.0), (3, 2, 1.0)]);
        {
            let mut sp = ShortestPaths::simple(&g, 1, lookup(&t));
            sp.run().unwrap();
            assert_eq!(sp.predecessor_of(2), 1);
        }
        g.remove_vertex(1);
        let mut sp = ShortestPaths::simple(&g, 3, lookup(&t));
        sp.run().unwrap();
        assert_eq!(sp.predecessor_of(2), 3);
        assert_eq!(sp.run(), sp.run());
    }

    #[test]
    fn test_custom_store_via_trait() {
        #[derive(Default)]
        struct MapStore {
            distances: HashMap<VertexId, f64>,
            preds: HashMap<VertexId, VertexId>,
        }

        impl PathStore for MapStore {
            fn reset(&mut self) {
                self.distances.clear();
                self.preds.clear();
            }
            fn distance(&self, v: VertexId) -> f64 {
                self.distances.get(&v).copied().unwrap_or(f64::INFINITY)
            }
            fn set_distance(&mut self, v: VertexId, distance: f64) {
                self.distances.insert(v, distance);
            }
            fn predecessor(&self, v: VertexId) -> VertexId {
                self.preds.get(&v).copied().unwrap_or(NO_VERTEX)
            }
            fn set_predecessor(&mut self, v: VertexId, u: VertexId) {
                self.preds.insert(v, u);
            }
        }

        let (g, t) = make_detour();
        let mut sp = ShortestPaths::new(&g, 1, lookup(&t), MapStore::default()).to(3);
        sp.run().unwrap();
        assert_eq!(sp.distance(3), 7.0);
        assert_eq!(sp.path().unwrap(), vec![1, 2, 4, 5, 3]);
    }

    // --- A* tests ---

    /// 5x5 unit grid, vertex (r, c) = r * 5 + c + 1.
    fn make_grid() -> (UndirectedGraph, Table) {
        let id = |r: usize, c: usize| r * 5 + c + 1;
        let mut edges = Vec::new();
        for r in 0..5 {
            for c in 0..5 {
                if c + 1 < 5 {
                    edges.push((id(r, c), id(r, c + 1), 1.0));
                }
                if r + 1 < 5 {
                    edges.push((id(r, c), id(r + 1, c), 1.0));
                }
            }
        }
        undirected(25, &edges)
    }

    fn manhattan_to(target: VertexId) -> impl Fn(VertexId) -> f64 {
        move |v| {
            let (r, c) = ((v - 1) / 5, (v - 1) % 5);
            let (tr, tc) = ((target - 1) / 5, (target - 1) % 5);
            (r.abs_diff(tr) + c.abs_diff(tc)) as f64
        }
    }

    #[test]
    fn test_astar_matches_dijkstra() {
        let (g, t) = make_grid();
        // Centre (2, 2) to (2, 4).
        let mut dijkstra = ShortestPaths::simple(&g, 13, lookup(&t)).to(15);
        let plain = dijkstra.run().unwrap();

        let weights = WithHeuristic::new(lookup(&t), manhattan_to(15));
        let mut astar = ShortestPaths::simple(&g, 13, weights).to(15);
        let guided = astar.run().unwrap();

        assert_eq!(dijkstra.distance(15), 2.0);
        assert_eq!(astar.distance(15), dijkstra.distance(15));
        assert_eq!(plain.settled, 10);
        assert_eq!(guided.settled, 3);
        assert_eq!(guided.reopened, 0);
        assert_eq!(astar.path().unwrap(), vec![13, 14, 15]);
    }

    #[test]
    fn test_inconsistent_heuristic_reopens() {
        // Admissible but inconsistent: h(2) = 5 hides the cheap route at first.
        let (g, t) = directed(
            4,
            &[(1, 2, 1.0), (1, 3, 2.0), (2, 3, 0.0), (3, 4, 5.0)],
        );
        let h = |v: VertexId| match v {
            2 => 5.0,
            _ => 0.0,
        };
        let mut sp = ShortestPaths::simple(&g, 1, WithHeuristic::new(lookup(&t), h)).to(4);
        let summary = sp.run().unwrap();
        assert_eq!(sp.distance(4), 6.0);
        assert_eq!(sp.path().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(summary.reopened, 1);
    }
}
