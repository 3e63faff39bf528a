//! Cactus graph construction and chain decomposition.

mod builder;
mod chain;

pub use builder::{build_cactus, CactusEdge, CactusGraph, CactusNodeId};
pub use chain::{all_chains_circular, chain_is_closed_walk, sorted_biconnected_components, Chain};
