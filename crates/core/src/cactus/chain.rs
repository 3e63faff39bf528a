//! Chains: maximal simple cycles of the cactus graph.
//!
//! Most chains arise directly: an edge whose endpoints the builder
//! quotiented into the same cactus node is already a self-loop, i.e. a
//! cycle of its own. The rest are bridges of the quotient graph, which by
//! the bridge-tree theorem necessarily form a forest over cactus nodes
//! rather than a cycle; `sorted_biconnected_components` first walks each
//! such maximal bridge path the way it always has (through cactus nodes
//! of degree exactly 2, stopping at branch points), then `circularise`
//! turns that open path into a genuine closed walk by appending its own
//! reverse — the stem-circularisation step a real cactus graph performs
//! before handing chains to the flower materialiser (P5: every edge lies
//! on a cycle).

use super::builder::{CactusEdge, CactusGraph, CactusNodeId};
use crate::pinch::BlockId;
use std::collections::{HashMap, HashSet};

/// One maximal chain: an ordered sequence of cactus edges forming a
/// closed walk (a single self-loop, or a circularised bridge path).
#[derive(Debug, Clone)]
pub struct Chain {
    pub edges: Vec<CactusEdge>,
}

impl Chain {
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.edges.iter().map(|e| e.block)
    }

    /// The chain's blocks with a circularised stem's doubled return pass
    /// collapsed back out: only edges in canonical orientation (`a <= b`)
    /// are kept, so a stem block that appears twice in `edges` (once per
    /// direction) is counted once. Self-loops are always canonical and so
    /// are unaffected.
    pub fn canonical_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.edges.iter().filter(|e| e.a <= e.b).map(|e| e.block)
    }
}

/// Group the cactus graph's edges into maximal chains by walking degree-2
/// runs of the bridge forest, circularise every non-self-loop chain into
/// a closed walk, and return them sorted by descending total block length
/// (the order the block filter examines chains in).
pub fn sorted_biconnected_components(cactus: &CactusGraph, block_length: impl Fn(BlockId) -> i64) -> Vec<Chain> {
    let mut adjacency: HashMap<CactusNodeId, Vec<usize>> = HashMap::new();
    for (i, e) in cactus.edges.iter().enumerate() {
        adjacency.entry(e.a).or_default().push(i);
        adjacency.entry(e.b).or_default().push(i);
    }

    let mut visited = HashSet::new();
    let mut chains = Vec::new();

    for (i, e) in cactus.edges.iter().enumerate() {
        if visited.contains(&i) {
            continue;
        }
        if e.a == e.b {
            // Self-loop: already a length-1 cycle on its own.
            visited.insert(i);
            chains.push(Chain { edges: vec![*e] });
            continue;
        }
        // Walk outward from this edge in both directions while the
        // endpoint we're extending through has degree exactly 2 (a
        // "pass-through" cactus node, not a branch point).
        let mut forward = walk_chain(e.b, i, &adjacency, cactus, &mut visited);
        let mut backward = walk_chain(e.a, i, &adjacency, cactus, &mut visited);
        visited.insert(i);
        backward.reverse();
        backward.push(*e);
        backward.append(&mut forward);
        chains.push(circularise(Chain { edges: backward }));
    }

    chains.sort_by(|a, b| {
        let la: i64 = a.canonical_blocks().map(&block_length).sum();
        let lb: i64 = b.canonical_blocks().map(&block_length).sum();
        lb.cmp(&la)
    });
    chains
}

/// Turn an open bridge path into a closed walk by appending its own
/// reverse, so the chain starts and ends at the same cactus node. A
/// single self-loop edge is already closed and is left untouched.
fn circularise(chain: Chain) -> Chain {
    if chain.edges.len() == 1 && chain.edges[0].a == chain.edges[0].b {
        return chain;
    }
    let mut edges = chain.edges;
    let mut doubled_back: Vec<CactusEdge> = edges
        .iter()
        .rev()
        .map(|e| CactusEdge {
            block: e.block,
            a: e.b,
            b: e.a,
        })
        .collect();
    edges.append(&mut doubled_back);
    Chain { edges }
}

/// Whether `chain`'s edges form a genuine closed walk: a single self-loop,
/// or a sequence whose consecutive edges share endpoints all the way
/// around back to where it started. Used to check P5 after circularisation
/// rather than on the raw pre-circularisation cactus graph, where residual
/// bridge paths still have open ends by definition.
pub fn chain_is_closed_walk(chain: &Chain) -> bool {
    let edges = &chain.edges;
    match edges.len() {
        0 => false,
        1 => edges[0].a == edges[0].b,
        _ => {
            let shares = |x: CactusNodeId, e: &CactusEdge| e.a == x || e.b == x;
            let other = |x: CactusNodeId, e: &CactusEdge| if e.a == x { e.b } else { e.a };
            let start = if shares(edges[0].a, &edges[1]) {
                edges[0].b
            } else if shares(edges[0].b, &edges[1]) {
                edges[0].a
            } else {
                return false;
            };
            let mut node = start;
            for e in edges {
                if !shares(node, e) {
                    return false;
                }
                node = other(node, e);
            }
            node == start
        }
    }
}

/// P5 over the whole chain set: every chain is a genuine closed walk.
pub fn all_chains_circular(chains: &[Chain]) -> bool {
    chains.iter().all(chain_is_closed_walk)
}

fn walk_chain(
    mut from: CactusNodeId,
    entry_edge: usize,
    adjacency: &HashMap<CactusNodeId, Vec<usize>>,
    cactus: &CactusGraph,
    visited: &mut HashSet<usize>,
) -> Vec<CactusEdge> {
    let mut out = Vec::new();
    let mut last_edge = entry_edge;
    loop {
        let incident = match adjacency.get(&from) {
            Some(v) => v,
            None => break,
        };
        if incident.len() != 2 {
            break;
        }
        let next_edge = incident.iter().copied().find(|&e| e != last_edge);
        let next_edge = match next_edge {
            Some(e) if !visited.contains(&e) => e,
            _ => break,
        };
        let e = cactus.edges[next_edge];
        if e.a == e.b {
            break;
        }
        visited.insert(next_edge);
        out.push(e);
        from = if e.a == from { e.b } else { e.a };
        last_edge = next_edge;
    }
    out
}
