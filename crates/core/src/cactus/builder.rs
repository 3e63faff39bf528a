//! Cactus construction: bridge-finding over the combined black+grey
//! multigraph, 2-edge-connected-component contraction, and the cactus
//! node/edge graph those components induce.
//!
//! This crate builds cactus nodes from 2-edge-connected components
//! rather than true 3-edge-connected components (see DESIGN.md, Open
//! Question OQ-1): bridge-finding is a well-understood linear-time DFS,
//! while exact 3-edge-connectivity needs substantially more machinery for
//! a benefit this crate's filter thresholds don't need.
//!
//! Every real black edge becomes a `CactusEdge` in the quotient graph, not
//! only the bridges: an edge whose endpoints fall in the same
//! 2-edge-connected component is a self-loop on its cactus node (it
//! already lies on a cycle), while an edge that survives as a bridge
//! connects two distinct nodes. Bridges necessarily form a forest over
//! cactus nodes (the bridge-tree theorem), so `chain.rs` circularises
//! each such maximal path into a genuine closed walk rather than leaving
//! it as an open tree path.

use crate::pinch::{BlockId, PinchGraph, VertexId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CactusNodeId(pub usize);

/// One edge of the cactus graph: the quotient image of a pinch block,
/// connecting two (possibly equal, for a self-loop) cactus nodes.
#[derive(Debug, Clone, Copy)]
pub struct CactusEdge {
    pub block: BlockId,
    pub a: CactusNodeId,
    pub b: CactusNodeId,
}

pub struct CactusGraph {
    /// Canonical pinch vertex -> cactus node.
    node_of: HashMap<VertexId, CactusNodeId>,
    pub node_count: usize,
    pub edges: Vec<CactusEdge>,
}

#[derive(Clone, Copy)]
struct RawEdge {
    block: Option<BlockId>,
    u: VertexId,
    v: VertexId,
}

impl CactusGraph {
    pub fn node_of(&self, v: VertexId) -> Option<CactusNodeId> {
        self.node_of.get(&v).copied()
    }
}

/// Build the cactus graph from a pinch graph whose stubs have already
/// been linked to the sink. `exclude_degree1` drops degree-1 (stub)
/// block edges from the cactus graph entirely, used for every round
/// except the last annealing round.
pub fn build_cactus(pinch: &mut PinchGraph, exclude_degree1: bool) -> CactusGraph {
    let mut raw_edges = Vec::new();
    let mut adjacency: HashMap<VertexId, Vec<usize>> = HashMap::new();
    let mut vertices: Vec<VertexId> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    let block_endpoints: Vec<(BlockId, bool, VertexId, VertexId)> = pinch
        .blocks()
        .map(|(id, block)| (id, block.is_stub(), block.five_prime, block.three_prime))
        .collect();
    for (id, is_stub, five_prime, three_prime) in block_endpoints {
        if exclude_degree1 && is_stub {
            continue;
        }
        let u = pinch.find_vertex(five_prime);
        let v = pinch.find_vertex(three_prime);
        push_edge(&mut raw_edges, &mut adjacency, &mut vertices, &mut seen, Some(id), u, v);
    }
    let sink_link_blocks: std::collections::HashSet<BlockId> = pinch
        .blocks()
        .filter(|(id, _)| pinch.is_sink_link_block(*id))
        .map(|(id, _)| id)
        .collect();
    let vertex_ids: Vec<VertexId> = pinch.vertices().map(|(id, _)| id).collect();
    for id in vertex_ids {
        let neighbors: Vec<VertexId> = pinch.vertex(id).grey_neighbors().collect();
        for n in neighbors {
            let n = pinch.find_vertex(n);
            if id < n {
                push_edge(&mut raw_edges, &mut adjacency, &mut vertices, &mut seen, None, id, n);
            }
        }
    }

    let bridges = find_bridges(&vertices, &adjacency, &raw_edges);
    let components = connected_components_excluding(&vertices, &adjacency, &raw_edges, &bridges);

    // Renumber component ids densely.
    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut dense = HashMap::new();
    for &v in &vertices {
        let comp = components[&v];
        let next_id = remap.len();
        let dense_id = *remap.entry(comp).or_insert(next_id);
        dense.insert(v, CactusNodeId(dense_id));
    }

    // Every real black edge becomes a cactus edge, not only the bridges:
    // an edge whose endpoints fell into the same 2-edge-connected
    // component is a self-loop here (it already lies on a cycle), while a
    // bridge connects two distinct nodes and is left for `chain.rs` to
    // circularise. Synthetic sink-link blocks stay out of the output
    // entirely; they only exist to keep the quotient graph connected.
    let mut edges = Vec::new();
    for raw in &raw_edges {
        let Some(block) = raw.block else { continue };
        if sink_link_blocks.contains(&block) {
            continue;
        }
        let a = dense[&raw.u];
        let b = dense[&raw.v];
        edges.push(CactusEdge { block, a, b });
    }

    CactusGraph {
        node_of: dense,
        node_count: remap.len(),
        edges,
    }
}

fn push_edge(
    raw_edges: &mut Vec<RawEdge>,
    adjacency: &mut HashMap<VertexId, Vec<usize>>,
    vertices: &mut Vec<VertexId>,
    seen: &mut std::collections::HashSet<VertexId>,
    block: Option<BlockId>,
    u: VertexId,
    v: VertexId,
) {
    let idx = raw_edges.len();
    raw_edges.push(RawEdge { block, u, v });
    for x in [u, v] {
        if seen.insert(x) {
            vertices.push(x);
        }
    }
    adjacency.entry(u).or_default().push(idx);
    adjacency.entry(v).or_default().push(idx);
}

/// Tarjan bridge-finding DFS over a (possibly disconnected, possibly
/// multi-edged) graph given as an edge list plus adjacency-by-edge-index.
fn find_bridges(
    vertices: &[VertexId],
    adjacency: &HashMap<VertexId, Vec<usize>>,
    edges: &[RawEdge],
) -> Vec<usize> {
    let mut disc: HashMap<VertexId, u32> = HashMap::new();
    let mut low: HashMap<VertexId, u32> = HashMap::new();
    let mut timer = 0u32;
    let mut bridges = Vec::new();

    for &root in vertices {
        if disc.contains_key(&root) {
            continue;
        }
        // Explicit stack DFS: (vertex, parent_edge, iterator position).
        let mut stack: Vec<(VertexId, Option<usize>, usize)> = vec![(root, None, 0)];
        disc.insert(root, timer);
        low.insert(root, timer);
        timer += 1;

        while let Some(&mut (u, parent_edge, ref mut i)) = stack.last_mut() {
            let empty = Vec::new();
            let incident = adjacency.get(&u).unwrap_or(&empty);
            if *i < incident.len() {
                let edge_idx = incident[*i];
                *i += 1;
                if Some(edge_idx) == parent_edge {
                    continue;
                }
                let e = edges[edge_idx];
                let w = if e.u == u { e.v } else { e.u };
                if let Some(&w_disc) = disc.get(&w) {
                    let lu = *low.get(&u).unwrap();
                    low.insert(u, lu.min(w_disc));
                } else {
                    disc.insert(w, timer);
                    low.insert(w, timer);
                    timer += 1;
                    stack.push((w, Some(edge_idx), 0));
                }
            } else {
                stack.pop();
                if let Some(&(parent, _, _)) = stack.last() {
                    let lw = *low.get(&u).unwrap();
                    let lp = *low.get(&parent).unwrap();
                    low.insert(parent, lp.min(lw));
                    if lw > *disc.get(&parent).unwrap() {
                        bridges.push(parent_edge.unwrap());
                    }
                }
            }
        }
    }
    bridges
}

/// Connected components of the graph with `bridges` removed.
fn connected_components_excluding(
    vertices: &[VertexId],
    adjacency: &HashMap<VertexId, Vec<usize>>,
    edges: &[RawEdge],
    bridges: &[usize],
) -> HashMap<VertexId, usize> {
    let bridge_set: std::collections::HashSet<usize> = bridges.iter().copied().collect();
    let mut comp: HashMap<VertexId, usize> = HashMap::new();
    let mut next = 0usize;
    for &root in vertices {
        if comp.contains_key(&root) {
            continue;
        }
        let mut stack = vec![root];
        comp.insert(root, next);
        while let Some(u) = stack.pop() {
            let empty = Vec::new();
            for &edge_idx in adjacency.get(&u).unwrap_or(&empty) {
                if bridge_set.contains(&edge_idx) {
                    continue;
                }
                let e = edges[edge_idx];
                let w = if e.u == u { e.v } else { e.u };
                if !comp.contains_key(&w) {
                    comp.insert(w, next);
                    stack.push(w);
                }
            }
        }
        next += 1;
    }
    comp
}
