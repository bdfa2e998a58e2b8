//! Weighted graph generators. All O(n + edges), single-threaded and
//! deterministic for a given seed.

use std::collections::HashMap;

use pathgraph_core::{Directed, Direction, EdgeId, Graph, Undirected, VertexId, Weighting};

/// Simple LCG for deterministic, fast pseudo-random numbers.
pub struct FastRng(u64);

impl FastRng {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next(&mut self, max: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) % max as u64) as usize
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// A vertex id in `1..=n`.
    pub fn vertex(&mut self, n: usize) -> VertexId {
        1 + self.next(n)
    }

    /// An edge weight in `[1, 10)`.
    pub fn weight(&mut self) -> f64 {
        1.0 + 9.0 * self.next_f64()
    }
}

/// A generated graph plus the payload attached to its edges.
///
/// Weights are keyed by [`Graph::edge_id`], the way an external label
/// table would attach data to edges.
pub struct Workload<D: Direction> {
    pub graph: Graph<D>,
    pub weights: HashMap<EdgeId, f64>,
    /// Grid coordinates per vertex, when the generator has a geometry.
    pub coords: Option<Vec<(usize, usize)>>,
}

impl<D: Direction> Workload<D> {
    fn with_vertices(n: usize) -> Self {
        let mut graph = Graph::with_capacity(n);
        for _ in 0..n {
            graph.add_vertex();
        }
        Self {
            graph,
            weights: HashMap::with_capacity(n * 4),
            coords: None,
        }
    }

    /// Add `(u, v)` with weight `w`; a repeated edge keeps its first weight.
    fn connect(&mut self, u: VertexId, v: VertexId, w: f64) -> pathgraph_core::Result<()> {
        let id = self.graph.add_edge(u, v)?;
        self.weights.entry(id).or_insert(w);
        Ok(())
    }

    pub fn table(&self) -> EdgeTable<'_, D> {
        EdgeTable {
            graph: &self.graph,
            weights: &self.weights,
        }
    }

    /// Manhattan distance between two vertices' grid cells. Every grid edge
    /// weighs at least 1, so this never overestimates.
    pub fn manhattan(&self, from: VertexId, to: VertexId) -> Option<f64> {
        let coords = self.coords.as_ref()?;
        let (a, b) = (coords.get(from)?, coords.get(to)?);
        Some((a.0.abs_diff(b.0) + a.1.abs_diff(b.1)) as f64)
    }
}

/// Edge weights resolved through the workload's edge-id table.
#[derive(Clone, Copy)]
pub struct EdgeTable<'a, D: Direction> {
    graph: &'a Graph<D>,
    weights: &'a HashMap<EdgeId, f64>,
}

impl<D: Direction> Weighting for EdgeTable<'_, D> {
    fn edge_weight(&self, u: VertexId, v: VertexId) -> f64 {
        self.weights
            .get(&self.graph.edge_id(u, v))
            .copied()
            .unwrap_or(f64::INFINITY)
    }
}

/// Square grid with right/down neighbours: the A* workload.
pub fn gen_grid(node_count: usize, seed: u64) -> pathgraph_core::Result<Workload<Undirected>> {
    let side = ((node_count as f64).sqrt() as usize).max(2);
    let mut w: Workload<Undirected> = Workload::with_vertices(side * side);
    let mut rng = FastRng::new(seed);
    let id = |r: usize, c: usize| r * side + c + 1;

    let mut coords = vec![(0, 0); side * side + 1];
    for r in 0..side {
        for c in 0..side {
            coords[id(r, c)] = (r, c);
            if c + 1 < side {
                let weight = rng.weight();
                w.connect(id(r, c), id(r, c + 1), weight)?;
            }
            if r + 1 < side {
                let weight = rng.weight();
                w.connect(id(r, c), id(r + 1, c), weight)?;
            }
        }
    }
    w.coords = Some(coords);
    Ok(w)
}

/// Erdos-Renyi style random arcs, ~5 per vertex.
pub fn gen_random(node_count: usize, seed: u64) -> pathgraph_core::Result<Workload<Directed>> {
    let mut w: Workload<Directed> = Workload::with_vertices(node_count);
    let mut rng = FastRng::new(seed);

    for _ in 0..node_count * 5 {
        let from = rng.vertex(node_count);
        let to = rng.vertex(node_count);
        if from != to {
            let weight = rng.weight();
            w.connect(from, to, weight)?;
        }
    }
    Ok(w)
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
pub fn gen_small_world(
    node_count: usize,
    seed: u64,
) -> pathgraph_core::Result<Workload<Undirected>> {
    let k = 4usize; // neighbours on each side
    let p = 0.05f64; // rewire probability
    let mut w: Workload<Undirected> = Workload::with_vertices(node_count);
    let mut rng = FastRng::new(seed);

    for i in 0..node_count {
        for j in 1..=k {
            let from = i + 1;
            let mut to = (i + j) % node_count + 1;
            if rng.next_f64() < p {
                let rewired = rng.vertex(node_count);
                if rewired != from {
                    to = rewired;
                }
            }
            let weight = rng.weight();
            w.connect(from, to, weight)?;
        }
    }
    Ok(w)
}

/// Two dense clusters joined by a thin chain of bridge vertices.
pub fn gen_barbell(node_count: usize, seed: u64) -> pathgraph_core::Result<Workload<Undirected>> {
    let bridge_len = 10usize;
    let cluster = (node_count.saturating_sub(bridge_len) / 2).max(2);
    let mut w: Workload<Undirected> = Workload::with_vertices(2 * cluster + bridge_len);
    let mut rng = FastRng::new(seed);

    let b_start = cluster + bridge_len + 1;
    for base in [1, b_start] {
        for i in 0..cluster {
            // Spine keeps each cluster connected.
            if i + 1 < cluster {
                let weight = rng.weight();
                w.connect(base + i, base + i + 1, weight)?;
            }
            for _ in 0..8usize.min(cluster - 1) {
                let target = rng.next(cluster);
                if target != i {
                    let weight = rng.weight();
                    w.connect(base + i, base + target, weight)?;
                }
            }
        }
    }

    // Bridge: last vertex of A, through the chain, into the first of B.
    for v in cluster..b_start {
        let weight = rng.weight();
        w.connect(v, v + 1, weight)?;
    }
    Ok(w)
}

/// Long directed chain with occasional two-step shortcuts. Deep paths.
pub fn gen_chain(node_count: usize, seed: u64) -> pathgraph_core::Result<Workload<Directed>> {
    let mut w: Workload<Directed> = Workload::with_vertices(node_count);
    let mut rng = FastRng::new(seed);

    for v in 1..node_count {
        let step = rng.weight();
        w.connect(v, v + 1, step)?;
        if v + 2 <= node_count && rng.next(10) == 0 {
            let shortcut = 2.0 * rng.weight();
            w.connect(v, v + 2, shortcut)?;
        }
    }
    Ok(w)
}
