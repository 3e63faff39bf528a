//! Pipeline configuration: every tunable of the annealing driver, with
//! defaults matching the source tool's documented defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub write_debug_files: bool,
    pub annealing_rounds: u32,
    pub align_repeats_at_round: u32,
    pub trim: i64,
    pub trim_change: i64,
    pub minimum_tree_coverage: f64,
    pub minimum_block_length: i64,
    pub minimum_block_length_change: i64,
    pub minimum_chain_length: i64,
    pub minimum_chain_length_change: i64,
    pub deannealing_rounds: u32,
    pub adjacency_component_overlap: u32,
    /// When true, the final round's block selection uses `min_degree = 0`
    /// instead of `2` (the source tool's flag for "this is the bottom of
    /// the flower recursion, keep even unique single-copy blocks").
    pub terminate_recursion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            write_debug_files: false,
            annealing_rounds: 1,
            align_repeats_at_round: 0,
            trim: 0,
            trim_change: 0,
            minimum_tree_coverage: 0.0,
            minimum_block_length: 0,
            minimum_block_length_change: 0,
            minimum_chain_length: 0,
            minimum_chain_length_change: 0,
            deannealing_rounds: 1,
            adjacency_component_overlap: 0,
            terminate_recursion: false,
        }
    }
}
