//! Pinch vertex identity and grey-edge (adjacency) bookkeeping.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Stable arena index for a pinch vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub usize);

/// A pinch vertex: opaque identity plus its grey-edge (adjacency) neighbours.
///
/// Black-edge incidence is not stored here — it is derived from the block
/// arena (`PinchGraph::blocks`) by scanning for segments whose `five_prime`
/// or `three_prime` endpoint is this vertex. Vertices are cheap and
/// numerous; blocks are the expensive structure to keep normalized.
#[derive(Debug, Clone, Default)]
pub struct Vertex {
    pub(crate) grey_neighbors: IndexSet<VertexId>,
    /// Marks this vertex as dead after being merged into another. Dead
    /// vertices are tombstoned, never reused, and excluded from all
    /// iteration.
    pub(crate) removed: bool,
}

impl Vertex {
    pub fn grey_neighbors(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.grey_neighbors.iter().copied()
    }

    pub fn grey_degree(&self) -> usize {
        self.grey_neighbors.len()
    }
}
