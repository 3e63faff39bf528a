//! Block filter: scores each surviving block against degree, length,
//! chain-length, and tree-coverage thresholds and partitions blocks into
//! keep/undo sets.

use crate::cactus::Chain;
use crate::piece::ContigId;
use crate::pinch::{BlockId, PinchGraph};
use indexmap::IndexSet;

/// Weighs each contig's contribution to "tree coverage": the fraction of
/// an external species tree a block's segments span. This crate doesn't
/// model the tree itself, only consumes a caller-supplied weighting of
/// contigs (summing to 1.0 across all contigs that matter for coverage).
pub trait TreeCoverageModel {
    fn weight(&self, contig: ContigId) -> f64;
}

/// Coverage model that weighs every contig equally. Adequate for tests
/// and for callers with no real species tree.
pub struct UniformTreeCoverage {
    per_contig: f64,
}

impl UniformTreeCoverage {
    pub fn new(contig_count: usize) -> Self {
        Self {
            per_contig: if contig_count == 0 {
                0.0
            } else {
                1.0 / contig_count as f64
            },
        }
    }
}

impl TreeCoverageModel for UniformTreeCoverage {
    fn weight(&self, _contig: ContigId) -> f64 {
        self.per_contig
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterThresholds {
    pub min_degree: usize,
    pub min_tree_coverage: f64,
    pub min_block_length: i64,
    pub min_chain_length: i64,
}

fn tree_coverage(pinch: &PinchGraph, block: BlockId, model: &dyn TreeCoverageModel) -> f64 {
    let Some(b) = pinch.block(block) else {
        return 0.0;
    };
    let contigs: IndexSet<ContigId> = b.segments.iter().map(|s| s.piece.contig).collect();
    contigs.iter().map(|&c| model.weight(c)).sum()
}

/// Partition the chains' blocks into the set kept under `thresholds`.
pub fn filter_blocks(
    chains: &[Chain],
    pinch: &PinchGraph,
    thresholds: FilterThresholds,
    model: &dyn TreeCoverageModel,
) -> IndexSet<BlockId> {
    let mut kept = IndexSet::new();
    for chain in chains {
        let chain_length: i64 = chain
            .canonical_blocks()
            .filter_map(|b| pinch.block(b).map(|blk| blk.length_bp()))
            .sum();
        if chain_length < thresholds.min_chain_length {
            continue;
        }
        for block in chain.canonical_blocks() {
            let Some(b) = pinch.block(block) else { continue };
            if b.degree() < thresholds.min_degree {
                continue;
            }
            if b.length_bp() < thresholds.min_block_length {
                continue;
            }
            if tree_coverage(pinch, block, model) < thresholds.min_tree_coverage {
                continue;
            }
            kept.insert(block);
        }
    }
    kept
}

/// `filter(min_degree=2, min_tc=0, min_bl=0, min_cl=0) \ filter(current)`:
/// the blocks that would pass the loosest sane filter but fail the
/// caller's actual thresholds, i.e. what the de-anneal loop should undo.
pub fn get_blocks_to_undo(
    chains: &[Chain],
    pinch: &PinchGraph,
    thresholds: FilterThresholds,
    model: &dyn TreeCoverageModel,
) -> IndexSet<BlockId> {
    let loose = FilterThresholds {
        min_degree: 2,
        min_tree_coverage: 0.0,
        min_block_length: 0,
        min_chain_length: 0,
    };
    let loose_set = filter_blocks(chains, pinch, loose, model);
    let kept = filter_blocks(chains, pinch, thresholds, model);
    loose_set.difference(&kept).copied().collect()
}
