//! Pairwise alignment model and the pull interface that feeds it to the
//! annealing driver.

pub mod source;
pub mod types;

pub use source::{AlignmentSource, VecAlignmentSource};
pub use types::{AlignedPair, Alignment, AlignmentOpType};
