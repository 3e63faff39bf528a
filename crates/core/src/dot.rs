//! Minimal Graphviz `.dot` rendering of the pinch and cactus graphs, for
//! `Config::write_debug_files`. This is a debug aid consumed by the CLI,
//! not part of the pipeline's default code path.

use crate::cactus::CactusGraph;
use crate::pinch::PinchGraph;
use std::fmt::Write as _;

/// Render a pinch graph's vertices and black edges as an undirected dot
/// graph. Grey edges are rendered dashed.
pub fn pinch_graph_to_dot(pinch: &PinchGraph) -> String {
    let mut out = String::new();
    out.push_str("graph pinch {\n");
    for (id, block) in pinch.blocks() {
        let _ = writeln!(
            out,
            "  v{} -- v{} [label=\"block{}\"];",
            block.five_prime.0, block.three_prime.0, id.0
        );
    }
    for (id, vertex) in pinch.vertices() {
        for n in vertex.grey_neighbors() {
            if id.0 < n.0 {
                let _ = writeln!(out, "  v{} -- v{} [style=dashed];", id.0, n.0);
            }
        }
    }
    out.push_str("}\n");
    out
}

/// Render a cactus graph's nodes and edges as an undirected dot graph.
pub fn cactus_graph_to_dot(cactus: &CactusGraph) -> String {
    let mut out = String::new();
    out.push_str("graph cactus {\n");
    for edge in &cactus.edges {
        let _ = writeln!(
            out,
            "  c{} -- c{} [label=\"block{}\"];",
            edge.a.0, edge.b.0, edge.block.0
        );
    }
    out.push_str("}\n");
    out
}
