//! # cactus-core
//!
//! Core library for the pinch/cactus comparative-genomics structural
//! inference engine: turns a stream of pairwise sequence alignments into
//! a hierarchical "flower" decomposition of homology relationships.
//!
//! See the project README and `DESIGN.md` for details.

pub mod alignment;
pub mod anneal;
pub mod cactus;
pub mod config;
pub mod dot;
pub mod error;
pub mod filter;
pub mod flower;
pub mod piece;
pub mod pinch;
pub mod sequence;
pub mod worker;

pub use anneal::run_pipeline;
pub use config::Config;
pub use error::{CactusError, Result};
pub use piece::{ContigId, Piece};
pub use worker::{CancelledError, LoopReporter, NoopMonitor, ProgressMonitor};
