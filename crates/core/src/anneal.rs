//! The annealing driver: the outer merge/cactify/de-anneal loop that
//! turns a stream of alignments into a materialised flower hierarchy.
//!
//! Grounded directly in the source tool's `cactusCorePipeline`: each
//! outer round drains the alignment source into the pinch graph under
//! filter-then-merge, builds the cactus, runs the de-annealing inner
//! loop to undo blocks that fail the current thresholds, then ratchets
//! trim/length parameters before the next round (or materialises on the
//! last round).

use crate::alignment::{AlignedPair, AlignmentSource};
use crate::cactus::{all_chains_circular, build_cactus, sorted_biconnected_components};
use crate::config::Config;
use crate::error::{CactusError, Result};
use crate::filter::{get_blocks_to_undo, filter_blocks, FilterThresholds, TreeCoverageModel};
use crate::flower::{materialise, FlowerModel};
use crate::piece::ContigId;
use crate::pinch::{AdjacencyComponentIndex, PinchGraph, VertexId};
use crate::sequence::{contains_repeat_bases, SequenceStore};
use crate::worker::{LoopReporter, ProgressMonitor};

/// Run the full annealing pipeline and return the materialised flower
/// model; its root flower holds the final hierarchy.
pub fn run_pipeline(
    contigs: &[(ContigId, i64)],
    alignments: &mut dyn AlignmentSource,
    sequences: &dyn SequenceStore,
    tree_model: &dyn TreeCoverageModel,
    config: &Config,
    monitor: &dyn ProgressMonitor,
) -> Result<FlowerModel> {
    if config.annealing_rounds == 0 {
        return Err(CactusError::Precondition(
            "annealing_rounds must be >= 1".into(),
        ));
    }
    let mut pinch = PinchGraph::construct(contigs);
    let mut trim = config.trim.max(0);
    let mut min_block_length = config.minimum_block_length.max(0);
    let mut min_chain_length = config.minimum_chain_length.max(0);

    for round in 0..config.annealing_rounds {
        if !monitor.keep_going() {
            return Err(CactusError::Cancelled(crate::worker::CancelledError));
        }
        let is_last_round = round + 1 == config.annealing_rounds;
        let align_repeats = round >= config.align_repeats_at_round;

        // Grounded in `cactusCorePipeline`: the first round starts with one
        // adjacency component spanning every vertex (nothing has diverged
        // yet), and every later round recomputes components fresh from the
        // pinch graph's current grey-edge structure via
        // `getAdjacencyComponents`, rather than keeping the initial
        // per-contig seeding fixed for the whole run.
        let mut adjacency = AdjacencyComponentIndex::default();
        if round == 0 {
            let all_vertices: Vec<VertexId> = pinch.vertices().map(|(id, _)| id).collect();
            adjacency.new_component(all_vertices);
        } else {
            for component in pinch.grey_connected_components() {
                adjacency.new_component(component);
            }
        }

        alignments.start_alignment_stack();
        let mut reporter = LoopReporter::new(0, 20, monitor, 0.0, 1.0, "annealing");
        while let Some(alignment) = alignments.next_alignment() {
            if !monitor.keep_going() {
                return Err(CactusError::Cancelled(crate::worker::CancelledError));
            }
            for (piece_a, piece_b) in alignment.match_pairs() {
                apply_filter_then_merge(
                    &mut pinch,
                    &mut adjacency,
                    piece_a,
                    piece_b,
                    trim,
                    align_repeats,
                    sequences,
                    config.adjacency_component_overlap,
                )?;
            }
            reporter.tick().map_err(CactusError::Cancelled)?;
        }
        reporter.finish();

        pinch.remove_trivial_grey_edge_components(&mut adjacency);
        pinch.link_stubs_to_sink(is_last_round);
        let exclude_degree1 = !is_last_round;
        let mut cactus = build_cactus(&mut pinch, exclude_degree1);
        let length_of = |b| pinch.block(b).map(|blk| blk.length_bp()).unwrap_or(0);
        let mut chains = sorted_biconnected_components(&cactus, length_of);

        let steps = config.deannealing_rounds.max(1);
        for step in 1..=steps {
            let cutoff = min_chain_length * step as i64 / steps as i64;
            let thresholds = FilterThresholds {
                min_degree: 2,
                min_tree_coverage: 0.0,
                min_block_length,
                min_chain_length: cutoff,
            };
            let to_undo: Vec<_> = get_blocks_to_undo(&chains, &pinch, thresholds, tree_model)
                .into_iter()
                .collect();
            if to_undo.is_empty() {
                continue;
            }
            pinch.remove_over_aligned_edges(&to_undo)?;
            cactus = build_cactus(&mut pinch, exclude_degree1);
            let length_of = |b| pinch.block(b).map(|blk| blk.length_bp()).unwrap_or(0);
            chains = sorted_biconnected_components(&cactus, length_of);
        }

        if cfg!(debug_assertions) {
            pinch.check_pinch_graph()?;
            if !all_chains_circular(&chains) {
                return Err(CactusError::Invariant(
                    "a chain failed to circularise into a closed walk".into(),
                ));
            }
        }

        if !is_last_round {
            trim = (trim + config.trim_change).max(0);
            min_block_length = (min_block_length + config.minimum_block_length_change).max(0);
            min_chain_length = (min_chain_length + config.minimum_chain_length_change).max(0);
            pinch.unlink_stubs_from_sink();
        } else {
            let final_thresholds = FilterThresholds {
                min_degree: if config.terminate_recursion { 0 } else { 2 },
                min_tree_coverage: config.minimum_tree_coverage,
                min_block_length,
                min_chain_length,
            };
            let kept = filter_blocks(&chains, &pinch, final_thresholds, tree_model);
            let mut model = FlowerModel::default();
            materialise(&mut model, &pinch, &chains, &kept);
            return Ok(model);
        }
    }
    unreachable!("loop always returns on its last iteration")
}

#[allow(clippy::too_many_arguments)]
fn apply_filter_then_merge(
    pinch: &mut PinchGraph,
    adjacency: &mut AdjacencyComponentIndex,
    piece_a: crate::piece::Piece,
    piece_b: crate::piece::Piece,
    trim: i64,
    align_repeats: bool,
    sequences: &dyn SequenceStore,
    overlap_bound: u32,
) -> Result<()> {
    // `trimmed` already encodes the "drop if bases <= 2*trim" rule.
    let (Some(trimmed_a), Some(trimmed_b)) = (piece_a.trimmed(trim), piece_b.trimmed(trim)) else {
        return Ok(());
    };
    if !align_repeats {
        let string_a = sequences.get_string(
            trimmed_a.contig,
            trimmed_a.positive_span().0,
            trimmed_a.bases(),
            trimmed_a.is_forward(),
        );
        let string_b = sequences.get_string(
            trimmed_b.contig,
            trimmed_b.positive_span().0,
            trimmed_b.bases(),
            trimmed_b.is_forward(),
        );
        if let (Some(a), Some(b)) = (&string_a, &string_b) {
            if contains_repeat_bases(a) || contains_repeat_bases(b) {
                return Ok(());
            }
        }
    }
    pinch.merge(trimmed_a, trimmed_b, adjacency, overlap_bound)?;
    Ok(())
}
