use crate::graph::VertexId;

/// Contract violations reported by the graph store and the shortest-path engine.
///
/// Pure queries (`contains`, degrees, adjacency sequences) never produce one
/// of these; they answer `false`, `0` or an empty sequence instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("vertex {0} is not in the graph")]
    InvalidVertex(VertexId),

    #[error("index {index} out of range for vertex {vertex} with {len} adjacent vertices")]
    IndexOutOfRange {
        vertex: VertexId,
        index: usize,
        len: usize,
    },

    #[error("vertex {0} is not reachable from the source")]
    UnreachableDestination(VertexId),

    #[error("no destination was specified for this search")]
    NoDestinationSpecified,
}

pub type Result<T> = std::result::Result<T, Error>;
