//! Flower materialisation: walks the final cactus graph's chains and
//! emits blocks, ends, chains, links, and groups into a `FlowerModel`.
//!
//! The walk is a BFS over the cactus nodes the chains touch ([`materialise`]
//! delegates the ordering to [`bfs_chain_order`]), mirroring the source
//! tool's net-construction pass: chains sharing a node materialise
//! together before the walk jumps to an unrelated component. Every
//! chain-end edge is only processed in its canonical orientation
//! (`a <= b`; see [`Chain::canonical_blocks`]), which both matches §4.6's
//! "link orientation canonicity" test and collapses a circularised stem's
//! doubled return pass back to one link per block.
//!
//! This crate materialises a single flower level: every chain's links and
//! every node's own blocks are emitted straight into the root flower, with
//! an empty nested flower created per link (satisfying the link/nested-flower
//! structural contract) rather than recursively populating each link's
//! interior with its own tangle content. `construct` never receives a
//! parent flower to inherit free stub ends from (this crate's pipeline
//! runs one top-level pass, not the source tool's recursive per-net
//! calls), so there is no genuine pre-existing free-stub input to
//! propagate here; see DESIGN.md for why the full recursive net/chain
//! algorithm of the source tool's `finishing.c` is scoped down this way.

use super::model::{BlockId as FlowerBlockId, EndKind, FlowerId, FlowerModel};
use crate::cactus::{CactusNodeId, Chain};
use crate::pinch::{BlockId as PinchBlockId, PinchGraph};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

pub fn materialise(
    model: &mut FlowerModel,
    pinch: &PinchGraph,
    chains: &[Chain],
    kept: &IndexSet<PinchBlockId>,
) -> FlowerId {
    let root = model.new_root();
    let mut block_map: IndexMap<PinchBlockId, FlowerBlockId> = IndexMap::new();

    for chain_idx in bfs_chain_order(chains) {
        let chain = &chains[chain_idx];
        let chain_blocks: Vec<PinchBlockId> = chain.canonical_blocks().filter(|b| kept.contains(b)).collect();
        if chain_blocks.is_empty() {
            continue;
        }
        let chain_id = model.new_chain(root);
        for pinch_block in chain_blocks {
            let flower_block = get_or_create_block(model, root, pinch, pinch_block, &mut block_map);
            let block = model.block(flower_block);
            let group = model.new_group(root, [block.five_end, block.three_end]);
            model.new_link(chain_id, group);
            model.group_make_empty_nested_flower(root, group);
        }
    }

    model.set_built_blocks_recursive(root);
    root
}

/// Visit chain indices in the order a BFS over the cactus nodes they
/// share would reach them: starting from an unvisited chain, pull in
/// every other chain that shares a cactus node with anything already
/// queued before moving on. Chains that touch nothing visited so far
/// start a new BFS root, in their original order, so every chain is
/// still emitted exactly once overall.
fn bfs_chain_order(chains: &[Chain]) -> Vec<usize> {
    let mut chains_of_node: HashMap<CactusNodeId, Vec<usize>> = HashMap::new();
    for (idx, chain) in chains.iter().enumerate() {
        for edge in &chain.edges {
            chains_of_node.entry(edge.a).or_default().push(idx);
            chains_of_node.entry(edge.b).or_default().push(idx);
        }
    }

    let mut visited = vec![false; chains.len()];
    let mut order = Vec::with_capacity(chains.len());
    for start in 0..chains.len() {
        if visited[start] {
            continue;
        }
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(idx) = stack.pop() {
            order.push(idx);
            for edge in &chains[idx].edges {
                for node in [edge.a, edge.b] {
                    if let Some(siblings) = chains_of_node.get(&node) {
                        for &sibling in siblings {
                            if !visited[sibling] {
                                visited[sibling] = true;
                                stack.push(sibling);
                            }
                        }
                    }
                }
            }
        }
    }
    order
}

fn get_or_create_block(
    model: &mut FlowerModel,
    flower: FlowerId,
    pinch: &PinchGraph,
    pinch_block: PinchBlockId,
    block_map: &mut IndexMap<PinchBlockId, FlowerBlockId>,
) -> FlowerBlockId {
    if let Some(&id) = block_map.get(&pinch_block) {
        return id;
    }
    let is_stub = pinch.block(pinch_block).map(|b| b.is_stub()).unwrap_or(false);
    let five_kind = if is_stub {
        EndKind::StubAttached
    } else {
        EndKind::BlockFivePrime(FlowerBlockId(0))
    };
    let three_kind = if is_stub {
        EndKind::StubAttached
    } else {
        EndKind::BlockThreePrime(FlowerBlockId(0))
    };
    let five_end = model.new_end(flower, five_kind);
    let three_end = model.new_end(flower, three_kind);
    let id = model.new_block(flower, pinch_block, five_end, three_end);
    // Back-patch the end kinds now that the block id is known (avoids a
    // chicken-and-egg between end creation and block creation).
    if !is_stub {
        model.end_mut(five_end).kind = EndKind::BlockFivePrime(id);
        model.end_mut(three_end).kind = EndKind::BlockThreePrime(id);
    }
    block_map.insert(pinch_block, id);
    id
}
