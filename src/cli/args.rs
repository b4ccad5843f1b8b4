//! CLI argument structures

use crate::config::{DEFAULT_BATCH_SIZE, DEFAULT_TOOL};
use clap::Parser;
use std::path::PathBuf;

/// Merge many data files in parallel batches with an external merge tool
#[derive(Parser, Debug)]
#[command(name = "ahadd")]
#[command(
    about = "ahadd - Merge many files in parallel batches with hadd or a compatible tool",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// File to write the merged result to
    #[arg(value_name = "OUTPUT_FILE")]
    pub output_file: PathBuf,

    /// Files to merge
    #[arg(value_name = "INPUT_FILES", required = true, num_args = 1..)]
    pub input_files: Vec<PathBuf>,

    /// Number of files merged by one tool invocation (must be greater than 1)
    #[arg(short = 'n', long, value_name = "N", default_value_t = DEFAULT_BATCH_SIZE)]
    pub n_files_at_once: usize,

    /// Directory in which to create temporary files (default: system temp dir)
    #[arg(short = 't', long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Keep temporary files after the merge
    #[arg(short = 's', long)]
    pub save_temp: bool,

    /// Overwrite the output file if it already exists
    #[arg(short = 'f', long)]
    pub force_overwrite: bool,

    /// Number of merge jobs to run at once (default: 1.5 per CPU)
    #[arg(short = 'j', long, value_name = "J")]
    pub jobs: Option<usize>,

    /// Merge executable to look up on PATH
    #[arg(long, value_name = "NAME", default_value = DEFAULT_TOOL)]
    pub tool: String,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only report warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}
