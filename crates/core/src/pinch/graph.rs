//! The pinch graph proper: vertices joined by black edges (blocks) and
//! grey edges (adjacencies), plus the `merge` operation that threads two
//! aligned pieces' coverage together subject to adjacency locality.

use super::adjacency::AdjacencyComponentIndex;
use super::block::{Block, BlockId, Segment};
use super::run_index::{RunEntry, RunIndex};
use super::vertex::{Vertex, VertexId};
use crate::error::{CactusError, Result};
use crate::piece::{ContigId, Piece};
use std::collections::HashMap;

/// The pinch graph. Vertices and blocks live in parallel arenas addressed
/// by stable indices; removal tombstones rather than reindexes, so
/// `VertexId`/`BlockId` values handed out earlier stay valid (or resolve
/// through `find_vertex`) for the graph's whole lifetime.
pub struct PinchGraph {
    vertices: Vec<Vertex>,
    vertex_parent: Vec<usize>,
    vertex_rank: Vec<u32>,
    blocks: Vec<Option<Block>>,
    runs: RunIndex,
    contig_lengths: HashMap<ContigId, i64>,
    /// Each contig's own telomere vertices, `(five_prime, three_prime)`.
    stubs: HashMap<ContigId, (VertexId, VertexId)>,
    /// Auxiliary blocks created by `link_stubs_to_sink`, keyed by the
    /// stub vertex they link, so `unlink_stubs_from_sink` can remove
    /// exactly them.
    sink_links: HashMap<VertexId, BlockId>,
    sink: VertexId,
}

impl PinchGraph {
    /// Seed a pinch graph from a set of contigs: two stub vertices and
    /// one trivial whole-contig block per contig, plus a distinguished
    /// sink vertex with no incident edges of its own.
    pub fn construct(contigs: &[(ContigId, i64)]) -> Self {
        let mut graph = PinchGraph {
            vertices: Vec::new(),
            vertex_parent: Vec::new(),
            vertex_rank: Vec::new(),
            blocks: Vec::new(),
            runs: RunIndex::default(),
            contig_lengths: HashMap::new(),
            stubs: HashMap::new(),
            sink_links: HashMap::new(),
            sink: VertexId(0),
        };
        graph.sink = graph.new_vertex();
        for &(contig, length) in contigs {
            let five = graph.new_vertex();
            let three = graph.new_vertex();
            let segments = vec![Segment {
                piece: Piece::new(contig, 1, length),
                block_forward: true,
            }];
            let block = graph.new_block(five, three, segments);
            graph.contig_lengths.insert(contig, length);
            graph.runs.register_contig(contig, length, block);
            graph.stubs.insert(contig, (five, three));
        }
        graph
    }

    pub fn sink(&self) -> VertexId {
        self.sink
    }

    pub fn stub_vertices(&self, contig: ContigId) -> Option<(VertexId, VertexId)> {
        self.stubs.get(&contig).copied()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0).and_then(|b| b.as_ref())
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.as_ref().map(|b| (BlockId(i), b)))
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.removed)
            .map(|(i, v)| (VertexId(i), v))
    }

    fn new_vertex(&mut self) -> VertexId {
        let id = self.vertices.len();
        self.vertices.push(Vertex::default());
        self.vertex_parent.push(id);
        self.vertex_rank.push(0);
        VertexId(id)
    }

    fn new_block(&mut self, five_prime: VertexId, three_prime: VertexId, segments: Vec<Segment>) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Some(Block::new(five_prime, three_prime, segments)));
        id
    }

    /// Resolve a vertex id to its union-find canonical representative.
    pub fn find_vertex(&mut self, v: VertexId) -> VertexId {
        let mut root = v.0;
        while self.vertex_parent[root] != root {
            root = self.vertex_parent[root];
        }
        let mut cur = v.0;
        while self.vertex_parent[cur] != root {
            let next = self.vertex_parent[cur];
            self.vertex_parent[cur] = root;
            cur = next;
        }
        VertexId(root)
    }

    /// Union two vertices, merging grey-edge neighbour sets into the
    /// survivor and tombstoning the loser. Returns the surviving id.
    fn union_vertices(&mut self, a: VertexId, b: VertexId, adjacency: &mut AdjacencyComponentIndex) -> VertexId {
        let a = self.find_vertex(a);
        let b = self.find_vertex(b);
        if a == b {
            return a;
        }
        let (survivor, loser) = if self.vertex_rank[a.0] < self.vertex_rank[b.0] {
            (b, a)
        } else {
            if self.vertex_rank[a.0] == self.vertex_rank[b.0] {
                self.vertex_rank[a.0] += 1;
            }
            (a, b)
        };
        self.vertex_parent[loser.0] = survivor.0;
        let loser_neighbors: Vec<VertexId> = self.vertices[loser.0].grey_neighbors().collect();
        for n in loser_neighbors {
            self.vertices[survivor.0].grey_neighbors.insert(n);
            let n = self.find_vertex(n);
            self.vertices[n.0].grey_neighbors.shift_remove(&loser);
            self.vertices[n.0].grey_neighbors.insert(survivor);
        }
        self.vertices[loser.0].removed = true;
        adjacency.union_vertices(survivor, loser);
        survivor
    }

    pub fn add_grey_edge(&mut self, a: VertexId, b: VertexId) {
        let a = self.find_vertex(a);
        let b = self.find_vertex(b);
        if a == b {
            return;
        }
        self.vertices[a.0].grey_neighbors.insert(b);
        self.vertices[b.0].grey_neighbors.insert(a);
    }

    /// Split `block` at `k` bases from its 5' end (`0 < k < length`),
    /// returning the two resulting block ids `(five_prime_side,
    /// three_prime_side)`. A fresh vertex is created at the cut.
    fn split_block_at(&mut self, block_id: BlockId, k: i64) -> (BlockId, BlockId) {
        let block = self.blocks[block_id.0].take().expect("split of tombstoned block");
        let total = block.length_bp();
        debug_assert!(k > 0 && k < total);
        let mid = self.new_vertex();
        let mut seg1 = Vec::with_capacity(block.segments.len());
        let mut seg2 = Vec::with_capacity(block.segments.len());
        for seg in &block.segments {
            let (s1, s2) = split_segment(*seg, k);
            seg1.push(s1);
            seg2.push(s2);
        }
        let spans: Vec<((i64, i64), (i64, i64))> = seg1
            .iter()
            .zip(seg2.iter())
            .map(|(s1, s2)| (s1.piece.positive_span(), s2.piece.positive_span()))
            .collect();
        let block1 = self.new_block(block.five_prime, mid, seg1);
        let block2 = self.new_block(mid, block.three_prime, seg2);

        for (i, seg) in block.segments.iter().enumerate() {
            let (lo, _hi) = seg.piece.positive_span();
            let contig_runs = self
                .runs
                .contig_mut(seg.piece.contig)
                .expect("contig registered at construct()");
            contig_runs.remove(lo);
            let (lo1, hi1) = spans[i].0;
            let (lo2, hi2) = spans[i].1;
            contig_runs.insert(
                lo1,
                RunEntry {
                    hi: hi1,
                    block: block1,
                    seg_index: i,
                },
            );
            contig_runs.insert(
                lo2,
                RunEntry {
                    hi: hi2,
                    block: block2,
                    seg_index: i,
                },
            );
        }
        (block1, block2)
    }

    /// Ensure a run boundary exists at absolute position `pos` for
    /// `contig`, splitting the covering block if `pos` falls strictly
    /// inside a run. A `pos` at or past either end of the contig is a
    /// no-op.
    fn split_boundary(&mut self, contig: ContigId, pos: i64) -> Result<()> {
        let length = *self
            .contig_lengths
            .get(&contig)
            .ok_or_else(|| CactusError::Precondition(format!("unknown contig {contig}")))?;
        if pos <= 1 || pos > length {
            return Ok(());
        }
        let (start, entry) = {
            let runs = self.runs.contig(contig).expect("registered contig");
            let start = runs
                .run_start_covering(pos - 1)
                .ok_or_else(|| CactusError::Invariant(format!("no run covers {contig}:{}", pos - 1)))?;
            (start, *runs.runs.get(&start).unwrap())
        };
        if entry.hi < pos {
            return Ok(());
        }
        let block = self
            .block(entry.block)
            .ok_or_else(|| CactusError::Invariant("run points at tombstoned block".into()))?;
        let seg = block.segments[entry.seg_index];
        let offset = pos - start;
        let block_offset = if seg.block_forward {
            offset
        } else {
            block.length_bp() - offset
        };
        self.split_block_at(entry.block, block_offset);
        Ok(())
    }

    /// Merge the alignment represented by `piece_a`/`piece_b` into shared
    /// blocks, splitting around any sub-interval whose endpoints fail the
    /// adjacency-locality check. Returns the total number of bases
    /// actually merged.
    pub fn merge(
        &mut self,
        piece_a: Piece,
        piece_b: Piece,
        adjacency: &mut AdjacencyComponentIndex,
        overlap_bound: u32,
    ) -> Result<i64> {
        if piece_a.bases() != piece_b.bases() {
            return Err(CactusError::Precondition(
                "merge requires equal-length pieces".into(),
            ));
        }
        let (lo_a, hi_a) = piece_a.positive_span();
        let (lo_b, hi_b) = piece_b.positive_span();
        self.split_boundary(piece_a.contig, lo_a)?;
        self.split_boundary(piece_a.contig, hi_a + 1)?;
        self.split_boundary(piece_b.contig, lo_b)?;
        self.split_boundary(piece_b.contig, hi_b + 1)?;

        // `a` walks absolute positions in increasing order; `b` walks in
        // the same direction only if the two pieces share a strand.
        let a_forward = piece_a.is_forward();
        let b_walks_increasing = piece_b.is_forward() == a_forward;
        let flip = a_forward != b_walks_increasing;

        let mut pos_a = lo_a;
        let mut pos_b = if b_walks_increasing { lo_b } else { hi_b };
        let mut remaining = piece_a.bases();
        let mut merged_bases = 0i64;

        while remaining > 0 {
            let (start_a, run_a) = self.run_covering(piece_a.contig, pos_a)?;
            let (start_b, run_b) = self.run_covering(piece_b.contig, pos_b)?;
            let room_a = run_a.hi - pos_a + 1;
            let room_b = if b_walks_increasing {
                run_b.hi - pos_b + 1
            } else {
                pos_b - start_b + 1
            };
            let step = room_a.min(room_b).min(remaining);

            if step < room_a {
                self.split_boundary(piece_a.contig, pos_a + step)?;
            }
            if step < room_b {
                let cut = if b_walks_increasing {
                    pos_b + step
                } else {
                    pos_b - step + 1
                };
                self.split_boundary(piece_b.contig, cut)?;
            }
            let (_, run_a) = self.run_covering(piece_a.contig, pos_a)?;
            let (_, run_b) = self.run_covering(piece_b.contig, pos_b)?;

            let va = self.find_vertex(self.block(run_a.block).unwrap().five_prime);
            let vb = self.find_vertex(self.block(run_b.block).unwrap().five_prime);
            if adjacency.within_overlap(va, vb, overlap_bound) {
                merged_bases += step;
                self.merge_blocks(run_a.block, run_b.block, flip, adjacency)?;
                adjacency.record_black_edge(va, vb);
            }

            pos_a += step;
            pos_b = if b_walks_increasing { pos_b + step } else { pos_b - step };
            remaining -= step;
        }
        Ok(merged_bases)
    }

    fn run_covering(&self, contig: ContigId, pos: i64) -> Result<(i64, RunEntry)> {
        let runs = self
            .runs
            .contig(contig)
            .ok_or_else(|| CactusError::Precondition(format!("unknown contig {contig}")))?;
        let start = runs
            .run_start_covering(pos)
            .ok_or_else(|| CactusError::Invariant(format!("no run covers {contig}:{pos}")))?;
        Ok((start, *runs.runs.get(&start).unwrap()))
    }

    /// Union two equal-length blocks into one, consuming the smaller by
    /// degree. `flip` is true when the two blocks are aligned on
    /// opposite strands relative to each other.
    fn merge_blocks(
        &mut self,
        block_a: BlockId,
        block_b: BlockId,
        flip: bool,
        adjacency: &mut AdjacencyComponentIndex,
    ) -> Result<BlockId> {
        if block_a == block_b {
            return Ok(block_a);
        }
        let deg_a = self.block(block_a).map(|b| b.degree()).unwrap_or(0);
        let deg_b = self.block(block_b).map(|b| b.degree()).unwrap_or(0);
        let (survivor, loser, flip) = if deg_a >= deg_b {
            (block_a, block_b, flip)
        } else {
            (block_b, block_a, flip)
        };

        let loser_block = self.blocks[loser.0].take().expect("merge of tombstoned block");
        let (surv_five, surv_three) = {
            let s = self.block(survivor).unwrap();
            (s.five_prime, s.three_prime)
        };

        let (loser_five_target, loser_three_target) = if flip {
            (surv_three, surv_five)
        } else {
            (surv_five, surv_three)
        };
        self.union_vertices(loser_five_target, loser_block.five_prime, adjacency);
        self.union_vertices(loser_three_target, loser_block.three_prime, adjacency);

        let base_index = self.block(survivor).unwrap().degree();
        for (offset, seg) in loser_block.segments.into_iter().enumerate() {
            let new_forward = if flip { !seg.block_forward } else { seg.block_forward };
            let new_seg = Segment {
                piece: seg.piece,
                block_forward: new_forward,
            };
            let contig = seg.piece.contig;
            let (lo, _) = seg.piece.positive_span();
            if let Some(entry) = self.runs.contig_mut(contig).and_then(|c| c.runs.get_mut(&lo)) {
                entry.block = survivor;
                entry.seg_index = base_index + offset;
            }
            self.blocks[survivor.0].as_mut().unwrap().segments.push(new_seg);
        }
        Ok(survivor)
    }

    /// Dissolve the named blocks back into per-segment singleton blocks,
    /// restoring separate vertices for each end. Used by the de-anneal
    /// loop to undo filtered-out blocks.
    pub fn remove_over_aligned_edges(&mut self, blocks_to_drop: &[BlockId]) -> Result<()> {
        for &id in blocks_to_drop {
            let block = match self.blocks[id.0].take() {
                Some(b) => b,
                None => continue,
            };
            for seg in block.segments {
                let five = self.new_vertex();
                let three = self.new_vertex();
                let contig = seg.piece.contig;
                let (lo, hi) = seg.piece.positive_span();
                let singleton = self.new_block(five, three, vec![seg]);
                if let Some(runs) = self.runs.contig_mut(contig) {
                    runs.remove(lo);
                    runs.insert(
                        lo,
                        RunEntry {
                            hi,
                            block: singleton,
                            seg_index: 0,
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Collapse any pair of vertices joined by a grey edge with no other
    /// incident black edges on either side. Idempotent; never touches a
    /// vertex that is a stub endpoint.
    pub fn remove_trivial_grey_edge_components(&mut self, adjacency: &mut AdjacencyComponentIndex) {
        let stub_vertices: std::collections::HashSet<VertexId> =
            self.stubs.values().flat_map(|&(a, b)| [a, b]).collect();
        let mut incident_black: HashMap<VertexId, u32> = HashMap::new();
        for (_, block) in self.blocks() {
            *incident_black.entry(block.five_prime).or_insert(0) += 1;
            *incident_black.entry(block.three_prime).or_insert(0) += 1;
        }
        let candidates: Vec<(VertexId, VertexId)> = self
            .vertices()
            .filter(|(id, _)| !stub_vertices.contains(id) && *id != self.sink)
            .filter_map(|(id, v)| {
                if v.grey_degree() == 1 && incident_black.get(&id).copied().unwrap_or(0) == 0 {
                    v.grey_neighbors().next().map(|n| (id, n))
                } else {
                    None
                }
            })
            .collect();
        for (a, b) in candidates {
            let a = self.find_vertex(a);
            let b = self.find_vertex(b);
            if a != b && !stub_vertices.contains(&a) && !stub_vertices.contains(&b) {
                self.union_vertices(a, b, adjacency);
            }
        }
    }

    /// Attach every free stub end to the sink via an auxiliary block, so
    /// the cactus builder sees one connected graph. `attach_ends`
    /// controls whether these links should survive into the final
    /// cactus; callers decide that by only calling `unlink` before the
    /// last round.
    /// Placeholder contig id for synthetic stub-to-sink edges, which
    /// carry no real sequence.
    const SINK_LINK_CONTIG: ContigId = ContigId(u64::MAX);

    pub fn link_stubs_to_sink(&mut self, attach_ends: bool) {
        let _ = attach_ends;
        let stub_ends: Vec<VertexId> = self.stubs.values().flat_map(|&(a, b)| [a, b]).collect();
        for v in stub_ends {
            let v = self.find_vertex(v);
            if self.sink_links.contains_key(&v) {
                continue;
            }
            let seg = Segment {
                piece: Piece::new(Self::SINK_LINK_CONTIG, 1, 1),
                block_forward: true,
            };
            let block = self.new_block(v, self.sink, vec![seg]);
            self.sink_links.insert(v, block);
        }
    }

    pub fn unlink_stubs_from_sink(&mut self) {
        let blocks: Vec<BlockId> = self.sink_links.values().copied().collect();
        for id in blocks {
            self.blocks[id.0] = None;
        }
        self.sink_links.clear();
    }

    /// Whether `block` is one of the synthetic stub-to-sink edges
    /// `link_stubs_to_sink` inserts, rather than a real content block. The
    /// cactus builder needs this to keep the sink-linking machinery out of
    /// the materialised chain/block output even though it must stay in the
    /// graph for the quotient's connectivity.
    pub fn is_sink_link_block(&self, block: BlockId) -> bool {
        self.sink_links.values().any(|&b| b == block)
    }

    /// Connected components of the graph's live canonical vertices under
    /// grey-edge adjacency alone. Grounded in the source tool's
    /// `getAdjacencyComponents`, which recomputes adjacency components
    /// from the pinch graph's current grey-edge structure at the start of
    /// every annealing round after the first, rather than keeping the
    /// round-0 per-contig seeding fixed for the whole run.
    pub fn grey_connected_components(&mut self) -> Vec<Vec<VertexId>> {
        let ids: Vec<VertexId> = self.vertices().map(|(id, _)| id).collect();
        let mut canon_ids: Vec<VertexId> = ids.iter().map(|&id| self.find_vertex(id)).collect();
        canon_ids.sort_by_key(|v| v.0);
        canon_ids.dedup();

        let mut neighbors_of: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
        for &v in &canon_ids {
            let raw_neighbors: Vec<VertexId> = self.vertex(v).grey_neighbors().collect();
            let mut canon_neighbors = Vec::with_capacity(raw_neighbors.len());
            for n in raw_neighbors {
                canon_neighbors.push(self.find_vertex(n));
            }
            neighbors_of.insert(v, canon_neighbors);
        }

        let mut visited: std::collections::HashSet<VertexId> = std::collections::HashSet::new();
        let mut components = Vec::new();
        for &root in &canon_ids {
            if !visited.insert(root) {
                continue;
            }
            let mut stack = vec![root];
            let mut component = vec![root];
            while let Some(v) = stack.pop() {
                if let Some(neighbors) = neighbors_of.get(&v) {
                    for &n in neighbors {
                        if visited.insert(n) {
                            stack.push(n);
                            component.push(n);
                        }
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Validate the structural invariants expected to hold continuously
    /// (I1–I2): every piece in at most one block, and every surviving
    /// block's segments agree on length.
    pub fn check_pinch_graph(&self) -> Result<()> {
        for (id, block) in self.blocks() {
            let expected = block.length_bp();
            for seg in &block.segments {
                if seg.piece.bases() != expected {
                    return Err(CactusError::Invariant(format!(
                        "block {:?} has mismatched segment lengths",
                        id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Split one segment of a block at `k` bases from the block's 5' end,
/// returning `(five_prime_side, three_prime_side)`.
fn split_segment(seg: Segment, k: i64) -> (Segment, Segment) {
    let total = seg.piece.bases();
    if seg.block_forward {
        let (head, tail) = seg.piece.split_head(k);
        (
            Segment {
                piece: head,
                block_forward: true,
            },
            Segment {
                piece: tail,
                block_forward: true,
            },
        )
    } else {
        let (head, tail) = seg.piece.split_head(total - k);
        (
            Segment {
                piece: tail,
                block_forward: false,
            },
            Segment {
                piece: head,
                block_forward: false,
            },
        )
    }
}
