//! Per-contig coverage index: maps absolute coordinate ranges to the
//! pinch block (and segment within it) currently covering them.
//!
//! Every contig's bases are covered by exactly one run at all times; a
//! run's extent shrinks as merges split its owning block into finer
//! pieces, but the union of all runs for a contig always equals its full
//! length (1-based, inclusive).

use super::block::BlockId;
use crate::piece::ContigId;
use std::collections::BTreeMap;

/// One contiguous absolute-coordinate run, backed by one segment of one
/// block.
#[derive(Debug, Clone, Copy)]
pub struct RunEntry {
    pub hi: i64,
    pub block: BlockId,
    pub seg_index: usize,
}

/// Coverage index for a single contig: absolute start position -> run.
#[derive(Debug, Clone, Default)]
pub struct ContigRuns {
    pub length: i64,
    pub runs: BTreeMap<i64, RunEntry>,
}

impl ContigRuns {
    pub fn new(length: i64, block: BlockId) -> Self {
        let mut runs = BTreeMap::new();
        if length > 0 {
            runs.insert(
                1,
                RunEntry {
                    hi: length,
                    block,
                    seg_index: 0,
                },
            );
        }
        Self { length, runs }
    }

    /// Find the run covering absolute position `pos`, returning its start.
    pub fn run_start_covering(&self, pos: i64) -> Option<i64> {
        self.runs
            .range(..=pos)
            .next_back()
            .filter(|(_, entry)| entry.hi >= pos)
            .map(|(&start, _)| start)
    }

    /// Collect the ordered list of runs whose union is exactly `[lo, hi]`.
    /// Callers must have already called `PinchGraph::split_boundary` at
    /// `lo` and `hi + 1` so no run straddles either edge.
    pub fn runs_in(&self, lo: i64, hi: i64) -> Vec<(i64, RunEntry)> {
        self.runs
            .range(lo..=hi)
            .map(|(&start, entry)| (start, *entry))
            .collect()
    }

    pub fn remove(&mut self, start: i64) -> Option<RunEntry> {
        self.runs.remove(&start)
    }

    pub fn insert(&mut self, start: i64, entry: RunEntry) {
        self.runs.insert(start, entry);
    }
}

/// Per-contig coverage tracked over the whole pinch graph.
#[derive(Debug, Clone, Default)]
pub struct RunIndex {
    pub(crate) by_contig: std::collections::HashMap<ContigId, ContigRuns>,
}

impl RunIndex {
    pub fn register_contig(&mut self, contig: ContigId, length: i64, block: BlockId) {
        self.by_contig
            .insert(contig, ContigRuns::new(length, block));
    }

    pub fn contig(&self, contig: ContigId) -> Option<&ContigRuns> {
        self.by_contig.get(&contig)
    }

    pub fn contig_mut(&mut self, contig: ContigId) -> Option<&mut ContigRuns> {
        self.by_contig.get_mut(&contig)
    }
}
