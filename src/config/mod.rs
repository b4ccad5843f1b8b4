//! Merge configuration
//!
//! Everything the reducer needs to know about a run is carried in
//! [`MergeConfig`], including whether the environment supports running
//! merge jobs in parallel at all.

use crate::error::{MergeError, MergeResult};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};


/// Number of files merged by one tool invocation unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Merge tool looked up on `PATH` unless configured otherwise
pub const DEFAULT_TOOL: &str = "hadd";

/// Extension given to intermediate files when the destination has none
pub const DEFAULT_EXTENSION: &str = "root";

/// Whether the execution environment can run merge jobs concurrently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// Parallel execution is supported; carries the detected CPU count
    Available(NonZeroUsize),
    /// No parallel support; every round runs sequentially
    Unavailable,
}

impl Parallelism {
    /// Probe the host for CPU information
    pub fn detect() -> Self {
        match std::thread::available_parallelism() {
            Ok(cpus) => Self::Available(cpus),
            Err(e) => {
                tracing::debug!("Parallel execution unavailable, falling back to one job: {}", e);
                Self::Unavailable
            }
        }
    }

    /// Default worker count: one and a half jobs per CPU, rounded down
    pub fn default_jobs(&self) -> usize {
        match self {
            Self::Available(cpus) => (cpus.get() * 3 / 2).max(1),
            Self::Unavailable => 1,
        }
    }
}

/// Configuration for a single merge run
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Resolved path of the merge executable
    pub tool: PathBuf,
    /// Maximum number of inputs per tool invocation
    pub batch_size: usize,
    /// Directory under which the scratch root is created (platform temp dir if unset)
    pub scratch_parent: Option<PathBuf>,
    /// Keep intermediate files after the run
    pub save_scratch: bool,
    /// Replace an existing destination file
    pub force_overwrite: bool,
    /// Requested number of concurrent merge jobs
    pub jobs: usize,
    /// Capability of the environment to honour `jobs`
    pub parallelism: Parallelism,
    /// Extension for intermediate files, without the leading dot
    pub extension: String,
}

impl MergeConfig {
    /// Create a configuration with defaults for the given tool
    pub fn new(tool: impl Into<PathBuf>, parallelism: Parallelism) -> Self {
        Self {
            tool: tool.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            scratch_parent: None,
            save_scratch: false,
            force_overwrite: false,
            jobs: parallelism.default_jobs(),
            parallelism,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_scratch_parent(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_parent = dir;
        self
    }

    pub fn with_save_scratch(mut self, save: bool) -> Self {
        self.save_scratch = save;
        self
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Derive the intermediate file extension from the destination path
    pub fn with_extension_from(mut self, destination: &Path) -> Self {
        self.extension = extension_for(destination);
        self
    }

    /// Number of jobs actually used, after accounting for the environment
    pub fn effective_jobs(&self) -> usize {
        match self.parallelism {
            Parallelism::Available(_) => self.jobs.max(1),
            Parallelism::Unavailable => 1,
        }
    }

    /// Reject settings under which the reduction can never converge
    pub fn validate(&self) -> MergeResult<()> {
        if self.batch_size <= 1 {
            return Err(MergeError::InvalidBatchSize {
                batch_size: self.batch_size,
            });
        }
        Ok(())
    }
}

/// Extension of `destination`, or [`DEFAULT_EXTENSION`] when it has none
pub fn extension_for(destination: &Path) -> String {
    destination
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_EXTENSION)
        .to_string()
}
