mod generators;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use pathgraph_core::{Direction, ShortestPaths, VertexId, WithHeuristic};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use generators::{FastRng, Workload};

const MIN_NODES: usize = 16;

#[derive(Parser, Debug)]
#[command(
    name = "pathgraph-bench",
    version,
    about = "Time shortest-path searches over generated weighted graphs"
)]
struct Args {
    /// Graph generator to benchmark.
    #[arg(value_enum, default_value_t = Mode::All, env = "PATHGRAPH_BENCH_MODE")]
    mode: Mode,

    /// Target vertex count per generated graph.
    #[arg(long, default_value_t = 100_000, env = "PATHGRAPH_BENCH_NODES")]
    nodes: usize,

    /// Seed for the generators and query selection.
    #[arg(long, default_value_t = 42, env = "PATHGRAPH_BENCH_SEED")]
    seed: u64,

    /// Number of point-to-point queries per graph.
    #[arg(long, default_value_t = 20, env = "PATHGRAPH_BENCH_QUERIES")]
    queries: usize,

    /// Emit one JSON object per graph instead of a table.
    #[arg(long, env = "PATHGRAPH_BENCH_JSON")]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Every generator below
    All,
    /// Square grid, also runs A* with a Manhattan heuristic
    Grid,
    /// Erdos-Renyi random directed arcs
    Random,
    /// Watts-Strogatz ring lattice + shortcuts
    Smallworld,
    /// Two dense clusters joined by a thin bridge
    Barbell,
    /// Long directed chain (deep paths)
    Chain,
}

#[derive(Debug, thiserror::Error)]
enum BenchError {
    #[error("--nodes must be at least {min}, got {0}", min = MIN_NODES)]
    TooFewNodes(usize),
    #[error(transparent)]
    Graph(#[from] pathgraph_core::Error),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct Report {
    generator: &'static str,
    vertices: usize,
    edges: usize,
    memory_bytes: usize,
    generate_ms: f64,
    full_search: FullSearch,
    queries: QueryStats,
    removal: RemovalStats,
}

#[derive(Debug, Serialize)]
struct FullSearch {
    ms: f64,
    settled: usize,
    reachable: usize,
}

#[derive(Debug, Default, Serialize)]
struct QueryStats {
    count: usize,
    reached: usize,
    dijkstra_ms: f64,
    dijkstra_settled: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    astar_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    astar_settled: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RemovalStats {
    removed: usize,
    remove_ms: f64,
    research_ms: f64,
    reachable_after: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "benchmark failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), BenchError> {
    if args.nodes < MIN_NODES {
        return Err(BenchError::TooFewNodes(args.nodes));
    }

    let selected = |m: Mode| args.mode == Mode::All || args.mode == m;
    if !args.json {
        println!("pathgraph-bench");
        println!("===============");
        println!();
    }

    if selected(Mode::Grid) {
        let (w, t) = timed(|| generators::gen_grid(args.nodes, args.seed));
        emit(args, bench_workload("Grid (A* capable)", w?, t, args)?)?;
    }
    if selected(Mode::Random) {
        let (w, t) = timed(|| generators::gen_random(args.nodes, args.seed));
        emit(args, bench_workload("Erdos-Renyi random", w?, t, args)?)?;
    }
    if selected(Mode::Smallworld) {
        let (w, t) = timed(|| generators::gen_small_world(args.nodes, args.seed));
        emit(args, bench_workload("Small-world (Watts-Strogatz)", w?, t, args)?)?;
    }
    if selected(Mode::Barbell) {
        let (w, t) = timed(|| generators::gen_barbell(args.nodes, args.seed));
        emit(args, bench_workload("Barbell (cluster-bridge-cluster)", w?, t, args)?)?;
    }
    if selected(Mode::Chain) {
        let (w, t) = timed(|| generators::gen_chain(args.nodes, args.seed));
        emit(args, bench_workload("Chain with shortcuts", w?, t, args)?)?;
    }
    Ok(())
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let t = Instant::now();
    let out = f();
    (out, t.elapsed())
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn bench_workload<D: Direction>(
    name: &'static str,
    mut workload: Workload<D>,
    gen_time: Duration,
    args: &Args,
) -> Result<Report, BenchError> {
    info!(
        generator = name,
        vertices = workload.graph.vertex_count(),
        edges = workload.graph.edge_count(),
        directed = workload.graph.is_directed(),
        "generated graph"
    );
    let mut rng = FastRng::new(args.seed ^ 0x9e37_79b9_7f4a_7c15);
    let source: VertexId = 1;
    let top = workload.graph.max_vertex_id();

    // Full shortest-path tree from the source.
    let full_search = {
        let mut sp = ShortestPaths::simple(&workload.graph, source, workload.table());
        let (summary, t) = timed(|| sp.run());
        let summary = summary?;
        FullSearch {
            ms: ms(t),
            settled: summary.settled,
            reachable: workload
                .graph
                .vertices()
                .filter(|&v| sp.distance(v).is_finite())
                .count(),
        }
    };

    // Point-to-point queries, Dijkstra and (on grids) A*.
    let mut queries = QueryStats {
        count: args.queries,
        ..QueryStats::default()
    };
    let guided = workload.coords.is_some();
    let mut astar_time = Duration::ZERO;
    let mut astar_settled = 0;
    let mut dijkstra_time = Duration::ZERO;
    for _ in 0..args.queries {
        let dest = rng.vertex(top);
        let table = workload.table();

        let mut dijkstra = ShortestPaths::simple(&workload.graph, source, table).to(dest);
        let (summary, t) = timed(|| dijkstra.run());
        let summary = summary?;
        dijkstra_time += t;
        queries.dijkstra_settled += summary.settled;
        if summary.reached_destination {
            queries.reached += 1;
        }

        if guided {
            let estimate = |v: VertexId| workload.manhattan(v, dest).unwrap_or(0.0);
            let mut astar =
                ShortestPaths::simple(&workload.graph, source, WithHeuristic::new(table, estimate))
                    .to(dest);
            let (summary, t) = timed(|| astar.run());
            let summary = summary?;
            astar_time += t;
            astar_settled += summary.settled;

            let (a, d) = (astar.distance(dest), dijkstra.distance(dest));
            if (a - d).abs() > 1e-9 * d.max(1.0) {
                warn!(dest, astar = a, dijkstra = d, "A* and Dijkstra disagree");
            }
        }
    }
    queries.dijkstra_ms = ms(dijkstra_time);
    if guided {
        queries.astar_ms = Some(ms(astar_time));
        queries.astar_settled = Some(astar_settled);
    }

    // Vertex removal followed by a fresh full search.
    let to_remove = (workload.graph.vertex_count() / 1000).clamp(1, 100);
    let victims: Vec<VertexId> = (0..to_remove)
        .map(|_| 2 + rng.next(top - 1))
        .collect();
    let (removed, remove_time) = timed(|| {
        victims
            .iter()
            .filter(|&&v| workload.graph.remove_vertex(v))
            .count()
    });
    let (reachable_after, research_time) = {
        let mut sp = ShortestPaths::simple(&workload.graph, source, workload.table());
        let (summary, t) = timed(|| sp.run());
        summary?;
        let reachable = workload
            .graph
            .vertices()
            .filter(|&v| sp.distance(v).is_finite())
            .count();
        (reachable, t)
    };

    Ok(Report {
        generator: name,
        vertices: workload.graph.vertex_count(),
        edges: workload.graph.edge_count(),
        memory_bytes: workload.graph.memory_usage(),
        generate_ms: ms(gen_time),
        full_search,
        queries,
        removal: RemovalStats {
            removed,
            remove_ms: ms(remove_time),
            research_ms: ms(research_time),
            reachable_after,
        },
    })
}

fn emit(args: &Args, report: Report) -> Result<(), BenchError> {
    if args.json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!("--- {} ---", report.generator);
    println!(
        "Generated in {:.1}ms: {} vertices, {} edges, ~{:.1}MB",
        report.generate_ms,
        report.vertices,
        report.edges,
        report.memory_bytes as f64 / 1_048_576.0
    );
    println!();
    println!(
        "{:<22} {:>10} {:>12} {:>12}",
        "search", "runs", "settled", "time (ms)"
    );
    println!("{:-<22} {:->10} {:->12} {:->12}", "", "", "", "");
    println!(
        "{:<22} {:>10} {:>12} {:>12.2}",
        "full tree", 1, report.full_search.settled, report.full_search.ms
    );
    let q = &report.queries;
    println!(
        "{:<22} {:>10} {:>12} {:>12.2}",
        "dijkstra to dest", q.count, q.dijkstra_settled, q.dijkstra_ms
    );
    if let (Some(t), Some(settled)) = (q.astar_ms, q.astar_settled) {
        println!(
            "{:<22} {:>10} {:>12} {:>12.2}",
            "a* to dest", q.count, settled, t
        );
    }
    println!();
    println!(
        "Reachable from 1: {} ({} of {} queries reached)",
        report.full_search.reachable, q.reached, q.count
    );
    let r = &report.removal;
    println!(
        "Removed {} vertices in {:.3}ms; re-search {:.2}ms, {} reachable",
        r.removed, r.remove_ms, r.research_ms, r.reachable_after
    );
    println!();
    Ok(())
}
