//! cactus-cli
//!
//! Thin command-line driver for the pinch/cactus structural inference
//! engine: reads a FASTA file and a plain-text alignment file, runs the
//! annealing pipeline, and reports the resulting flower's block/chain/
//! group counts.
//!
//! ## Subcommands
//!
//! ```text
//! cactus anneal <fasta> <alignments> [options]   Run the pipeline
//! ```

mod input;

use cactus_core::alignment::VecAlignmentSource;
use cactus_core::filter::UniformTreeCoverage;
use cactus_core::worker::ProgressMonitor;
use cactus_core::Config;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

/// Wraps an `indicatif` bar, per the monitor table in
/// `cactus_core::worker`'s doc comment. Cancellation is a plain flag rather
/// than a signal handler; this crate doesn't depend on `ctrlc`.
struct CliMonitor {
    bar: ProgressBar,
    cancelled: AtomicBool,
}

impl CliMonitor {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40}] {percent}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self {
            bar,
            cancelled: AtomicBool::new(false),
        }
    }
}

impl ProgressMonitor for CliMonitor {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total.max(1));
    }

    fn update(&self, done: u64) -> bool {
        self.bar.set_position(done);
        !self.cancelled.load(Ordering::Relaxed)
    }

    fn update_with_phase(&self, done: u64, phase: &str) -> bool {
        self.bar.set_message(phase.to_string());
        self.bar.set_position(done.min(100));
        !self.cancelled.load(Ordering::Relaxed)
    }

    fn keep_going(&self) -> bool {
        !self.cancelled.load(Ordering::Relaxed)
    }
}

#[derive(Parser, Debug)]
#[command(name = "cactus", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the annealing pipeline over a FASTA + alignment file pair.
    Anneal(AnnealArgs),
}

#[derive(Parser, Debug)]
struct AnnealArgs {
    /// FASTA file naming every contig referenced by the alignment file.
    fasta: PathBuf,

    /// Whitespace-delimited pairwise alignment file.
    alignments: PathBuf,

    #[arg(long, default_value_t = 1)]
    annealing_rounds: u32,

    #[arg(long, default_value_t = 1)]
    deannealing_rounds: u32,

    #[arg(long, default_value_t = 0)]
    align_repeats_at_round: u32,

    #[arg(long, default_value_t = 0)]
    trim: i64,

    #[arg(long, default_value_t = 0)]
    trim_change: i64,

    #[arg(long, default_value_t = 0.0)]
    minimum_tree_coverage: f64,

    #[arg(long, default_value_t = 0)]
    minimum_block_length: i64,

    #[arg(long, default_value_t = 0)]
    minimum_block_length_change: i64,

    #[arg(long, default_value_t = 0)]
    minimum_chain_length: i64,

    #[arg(long, default_value_t = 0)]
    minimum_chain_length_change: i64,

    #[arg(long, default_value_t = 0)]
    adjacency_component_overlap: u32,

    #[arg(long)]
    terminate_recursion: bool,

    /// Emit `pinch.dot` / `cactus.dot` debug graphs into the working
    /// directory before materialisation.
    #[arg(long)]
    write_debug_files: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Anneal(args) => run_anneal(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_anneal(args: AnnealArgs) -> Result<(), Box<dyn std::error::Error>> {
    let fasta = input::parse_fasta(&args.fasta)?;
    let alignments = input::parse_alignments(&args.alignments, &fasta.names)?;

    let config = Config {
        write_debug_files: args.write_debug_files,
        annealing_rounds: args.annealing_rounds,
        align_repeats_at_round: args.align_repeats_at_round,
        trim: args.trim,
        trim_change: args.trim_change,
        minimum_tree_coverage: args.minimum_tree_coverage,
        minimum_block_length: args.minimum_block_length,
        minimum_block_length_change: args.minimum_block_length_change,
        minimum_chain_length: args.minimum_chain_length,
        minimum_chain_length_change: args.minimum_chain_length_change,
        deannealing_rounds: args.deannealing_rounds,
        adjacency_component_overlap: args.adjacency_component_overlap,
        terminate_recursion: args.terminate_recursion,
    };

    let tree_model = UniformTreeCoverage::new(fasta.contigs.len());
    let mut source = VecAlignmentSource::new(alignments);
    let monitor = CliMonitor::new();
    let model = cactus_core::run_pipeline(
        &fasta.contigs,
        &mut source,
        &fasta.sequences,
        &tree_model,
        &config,
        &monitor,
    )?;
    monitor.bar.finish_and_clear();

    if config.write_debug_files {
        eprintln!("note: --write-debug-files is accepted but graph emission happens per-round inside the pipeline, not at the CLI boundary; re-run with a debug build to inspect pinch/cactus state directly.");
    }

    let root = model.root();
    let flower = model.flower(root);
    println!("blocks: {}", flower.blocks.len());
    println!("chains: {}", flower.chains.len());
    println!("groups: {}", flower.groups.len());
    println!("ends: {}", flower.ends.len());
    Ok(())
}
