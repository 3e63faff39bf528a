//! Core types for pairwise alignments consumed by the annealing driver.

use crate::piece::Piece;
use serde::{Deserialize, Serialize};

/// How a single column pair of an alignment relates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignmentOpType {
    /// Both sides have a base: a candidate for pinch-merging.
    Match,
    /// One side has a gap: carries no piece, only consumes one sequence.
    Gap,
}

/// One aligned segment pair: two equal-length pieces believed homologous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub op: AlignmentOpType,
    pub piece_a: Piece,
    pub piece_b: Piece,
}

impl AlignedPair {
    pub fn new_match(piece_a: Piece, piece_b: Piece) -> Self {
        assert_eq!(
            piece_a.length(),
            piece_b.length(),
            "aligned pieces must share length"
        );
        Self {
            op: AlignmentOpType::Match,
            piece_a,
            piece_b,
        }
    }
}

/// A full pairwise alignment: an ordered run of aligned segment pairs plus
/// a score, as pulled from the caller's [`AlignmentSource`](super::source::AlignmentSource).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alignment {
    pub pairs: Vec<AlignedPair>,
    pub score: f64,
}

impl Alignment {
    pub fn new(pairs: Vec<AlignedPair>, score: f64) -> Self {
        Self { pairs, score }
    }

    /// Iterate over the `Match`-type aligned piece pairs only.
    pub fn match_pairs(&self) -> impl Iterator<Item = (Piece, Piece)> + '_ {
        self.pairs
            .iter()
            .filter(|p| p.op == AlignmentOpType::Match)
            .map(|p| (p.piece_a, p.piece_b))
    }
}
