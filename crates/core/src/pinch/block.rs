//! Pinch blocks (black edges): ordered sets of equal-length aligned
//! segments sharing a pair of endpoint vertices.

use super::vertex::VertexId;
use crate::piece::Piece;
use serde::{Deserialize, Serialize};

/// Stable arena index for a pinch block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub usize);

/// Which end of a block is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockSide {
    FivePrime,
    ThreePrime,
}

/// One aligned segment within a block: a piece plus its orientation
/// relative to the block's own canonical 5'->3' direction.
///
/// `block_forward` is the single bit that XORs with a pinch-end's
/// orientation to decide whether a segment's sequence must be reverse
/// complemented when read out of the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub piece: Piece,
    pub block_forward: bool,
}

/// A pinch block: the set of segments believed homologous, plus the two
/// vertices its ends are incident to.
#[derive(Debug, Clone)]
pub struct Block {
    pub five_prime: VertexId,
    pub three_prime: VertexId,
    pub segments: Vec<Segment>,
    pub(crate) removed: bool,
}

impl Block {
    pub fn new(five_prime: VertexId, three_prime: VertexId, segments: Vec<Segment>) -> Self {
        Self {
            five_prime,
            three_prime,
            segments,
            removed: false,
        }
    }

    /// Degree: number of segments (parallel aligned sequences) in this block.
    pub fn degree(&self) -> usize {
        self.segments.len()
    }

    /// Length in base pairs (all segments share length by construction).
    pub fn length_bp(&self) -> i64 {
        self.segments.first().map(|s| s.piece.bases()).unwrap_or(0)
    }

    /// Whether this is a stub block: a degree-1 block with no homology,
    /// representing an unaligned run of one contig.
    pub fn is_stub(&self) -> bool {
        self.degree() == 1
    }

    pub fn end_vertex(&self, side: BlockSide) -> VertexId {
        match side {
            BlockSide::FivePrime => self.five_prime,
            BlockSide::ThreePrime => self.three_prime,
        }
    }

    pub fn other_side(side: BlockSide) -> BlockSide {
        match side {
            BlockSide::FivePrime => BlockSide::ThreePrime,
            BlockSide::ThreePrime => BlockSide::FivePrime,
        }
    }
}
