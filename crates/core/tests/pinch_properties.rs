//! Property-style checks on the pinch graph and cactus layers, run over a
//! handful of representative small cases rather than a generator (the
//! domain doesn't lend itself to cheap `proptest` shrinking: every input
//! must already satisfy "equal-length pieces on registered contigs").

use cactus_core::cactus::{all_chains_circular, build_cactus, sorted_biconnected_components};
use cactus_core::piece::{ContigId, Piece};
use cactus_core::pinch::{AdjacencyComponentIndex, PinchGraph};

fn fresh_pair(len: i64) -> (PinchGraph, AdjacencyComponentIndex) {
    let graph = PinchGraph::construct(&[(ContigId(1), len), (ContigId(2), len)]);
    (graph, AdjacencyComponentIndex::default())
}

/// P1: `merge` never changes the total base count of either contig — it
/// only regroups existing runs into shared blocks, it can't create or
/// destroy sequence.
#[test]
fn property_merge_preserves_contig_length() {
    let (mut pinch, mut adjacency) = fresh_pair(30);
    adjacency.new_component([pinch.stub_vertices(ContigId(1)).unwrap().0]);
    adjacency.new_component([pinch.stub_vertices(ContigId(2)).unwrap().0]);
    let a = Piece::new(ContigId(1), 5, 24);
    let b = Piece::new(ContigId(2), 1, 20);
    pinch.merge(a, b, &mut adjacency, 100).unwrap();
    pinch.check_pinch_graph().unwrap();

    let total_bases_a: i64 = pinch
        .blocks()
        .flat_map(|(_, b)| b.segments.iter())
        .filter(|s| s.piece.contig == ContigId(1))
        .map(|s| s.piece.bases())
        .sum();
    assert_eq!(total_bases_a, 30);
}

/// P2: a merge whose adjacency components are farther apart than
/// `overlap_bound` is rejected (no blocks unify), mirroring §4.3's
/// locality rule.
#[test]
fn property_merge_respects_adjacency_locality_bound() {
    let (mut pinch, mut adjacency) = fresh_pair(10);
    // Two fully disjoint components (no shared or linked component), and
    // a bound of 0 only allows same-component merges.
    adjacency.new_component([pinch.stub_vertices(ContigId(1)).unwrap().0]);
    adjacency.new_component([pinch.stub_vertices(ContigId(2)).unwrap().0]);
    let a = Piece::new(ContigId(1), 1, 10);
    let b = Piece::new(ContigId(2), 1, 10);
    let merged = pinch.merge(a, b, &mut adjacency, 0).unwrap();
    assert_eq!(merged, 0, "disjoint components outside the overlap bound must not merge");
    assert!(pinch.blocks().all(|(_, blk)| blk.degree() == 1));
}

/// P3: `AdjacencyComponentIndex::union_vertices` folds the losing
/// vertex's component membership into the survivor rather than
/// discarding it, matching `PinchGraph::union_vertices`'s expectation
/// that locality checks survive a vertex merge.
#[test]
fn property_vertex_union_preserves_component_membership() {
    use cactus_core::pinch::VertexId;
    let mut idx = AdjacencyComponentIndex::default();
    let c0 = idx.new_component([VertexId(0)]);
    let c1 = idx.new_component([VertexId(1)]);
    assert!(!idx.within_overlap(VertexId(0), VertexId(1), 0));

    idx.union_vertices(VertexId(0), VertexId(1));
    let comps: std::collections::HashSet<_> = idx.components_of(VertexId(0)).collect();
    assert!(comps.contains(&c0) && comps.contains(&c1));
}

/// P5: after stem circularisation, every chain derived from
/// `build_cactus`'s output is a genuine closed walk, on both a trivial
/// and a stub-linked graph.
#[test]
fn property_cactus_chains_are_circular() {
    let mut pinch = PinchGraph::construct(&[(ContigId(1), 10), (ContigId(2), 10)]);
    let mut adjacency = AdjacencyComponentIndex::default();
    adjacency.new_component([pinch.stub_vertices(ContigId(1)).unwrap().0]);
    adjacency.new_component([pinch.stub_vertices(ContigId(2)).unwrap().0]);
    let a = Piece::new(ContigId(1), 1, 10);
    let b = Piece::new(ContigId(2), 1, 10);
    pinch.merge(a, b, &mut adjacency, 100).unwrap();
    pinch.link_stubs_to_sink(true);
    let cactus = build_cactus(&mut pinch, false);
    let length_of = |b| pinch.block(b).map(|blk| blk.length_bp()).unwrap_or(0);
    let chains = sorted_biconnected_components(&cactus, length_of);
    assert!(all_chains_circular(&chains));
}

/// P6: de-annealing (`remove_over_aligned_edges`) is reversible in the
/// sense that it never leaves a run index pointing at a tombstoned block;
/// every contig position still resolves to a live block afterward.
#[test]
fn property_remove_over_aligned_edges_keeps_run_index_consistent() {
    let (mut pinch, mut adjacency) = fresh_pair(10);
    adjacency.new_component([pinch.stub_vertices(ContigId(1)).unwrap().0]);
    adjacency.new_component([pinch.stub_vertices(ContigId(2)).unwrap().0]);
    let a = Piece::new(ContigId(1), 1, 10);
    let b = Piece::new(ContigId(2), 1, 10);
    pinch.merge(a, b, &mut adjacency, 100).unwrap();
    let merged = pinch.blocks().find(|(_, b)| b.degree() == 2).unwrap().0;
    pinch.remove_over_aligned_edges(&[merged]).unwrap();
    pinch.check_pinch_graph().unwrap();
    assert_eq!(pinch.blocks().filter(|(_, b)| b.degree() == 2).count(), 0);
}
