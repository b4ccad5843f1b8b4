//! Batched tournament reduction of many files into one
//!
//! The reducer repeatedly partitions its current inputs into batches,
//! merges each batch with the external tool, and feeds the round's outputs
//! back in until a single survivor is left. The survivor is copied to the
//! destination and the scratch root is released.

pub mod executor;
pub mod partition;
pub mod scratch;


pub use executor::{ExecutionMode, Executor};
pub use partition::{chunk_output_path, rounds_needed, ChunkJob, Partitioner};
pub use scratch::{list_round_outputs, ScratchRoot};

use crate::config::MergeConfig;
use crate::error::{ErrorCode, MergeError, MergeResult};
use crate::subprocess::ProcessRunner;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the reducer is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducerState {
    Init,
    Round(usize),
    Finalize,
    Done,
    Failed,
}

/// Refuse to clobber `destination` unless overwriting was requested.
///
/// Returns whether an existing file will be replaced.
pub fn destination_writable(destination: &Path, force_overwrite: bool) -> MergeResult<bool> {
    if !destination.exists() {
        return Ok(false);
    }
    if !force_overwrite {
        return Err(MergeError::DestinationExists {
            path: destination.to_path_buf(),
        });
    }
    Ok(true)
}

/// [`destination_writable`], warning when the destination will be replaced
pub fn check_destination(destination: &Path, force_overwrite: bool) -> MergeResult<()> {
    if destination_writable(destination, force_overwrite)? {
        warn!(
            "Output file already exists; it will be overwritten! File: {}",
            destination.display()
        );
    }
    Ok(())
}

/// Copy `source` to `destination`, keeping permissions and timestamps
/// where the platform allows it
pub async fn copy_preserving(source: &Path, destination: &Path) -> MergeResult<()> {
    let source = source.to_path_buf();
    let destination = destination.to_path_buf();
    tokio::task::spawn_blocking(move || copy_blocking(&source, &destination))
        .await
        .map_err(|e| MergeError::execution("Copy task failed").with_source(e))?
}

fn copy_blocking(source: &Path, destination: &Path) -> MergeResult<()> {
    fs::copy(source, destination).map_err(|e| {
        MergeError::storage(
            ErrorCode::STORAGE_COPY_FAILED,
            format!("Failed to copy {}", source.display()),
            destination,
            e,
        )
    })?;

    if let Err(e) = copy_timestamps(source, destination) {
        debug!(
            "Could not preserve timestamps on {}: {}",
            destination.display(),
            e
        );
    }
    Ok(())
}

fn copy_timestamps(source: &Path, destination: &Path) -> std::io::Result<()> {
    let meta = fs::metadata(source)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    File::options()
        .write(true)
        .open(destination)?
        .set_times(times)
}

/// Handle a lone input without running any merge round
pub async fn copy_single_input(input: &Path, destination: &Path) -> MergeResult<()> {
    info!("Only one input file; running a simple copy!");
    info!(
        "Copying final file: {} --> {}",
        input.display(),
        destination.display()
    );
    copy_preserving(input, destination).await
}

/// Drives the round loop for one merge run
pub struct BatchReducer {
    destination: PathBuf,
    inputs: Vec<PathBuf>,
    batch_size: usize,
    extension: String,
    scratch: ScratchRoot,
    partitioner: Partitioner<StdRng>,
    executor: Executor,
    state: ReducerState,
}

impl BatchReducer {
    /// Validate the run and claim a scratch root.
    ///
    /// Nothing is created on disk when a precondition fails.
    pub fn new(
        config: &MergeConfig,
        destination: impl Into<PathBuf>,
        inputs: Vec<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
    ) -> MergeResult<Self> {
        let destination = destination.into();
        config.validate()?;
        if inputs.is_empty() {
            return Err(MergeError::NoInputFiles);
        }
        destination_writable(&destination, config.force_overwrite)?;

        let scratch = ScratchRoot::create(config.scratch_parent.as_deref(), config.save_scratch)?;
        let jobs = config.effective_jobs();
        debug!("Using {} merge job(s)", jobs);

        Ok(Self {
            destination,
            inputs,
            batch_size: config.batch_size,
            extension: config.extension.clone(),
            scratch,
            partitioner: Partitioner::new(
                config.batch_size,
                config.extension.clone(),
                StdRng::from_os_rng(),
            ),
            executor: Executor::new(runner, &config.tool, jobs),
            state: ReducerState::Init,
        })
    }

    /// Replace the source of randomness used for intermediate file names
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.partitioner = Partitioner::new(self.batch_size, self.extension.clone(), rng);
        self
    }

    pub fn state(&self) -> ReducerState {
        self.state
    }

    pub fn scratch_root(&self) -> &Path {
        self.scratch.path()
    }

    /// Merge every input into the destination.
    ///
    /// The scratch root is released whichever way the run ends, unless it
    /// is retained. A cleanup failure after a merge failure is only logged.
    pub async fn run(&mut self) -> MergeResult<PathBuf> {
        info!("Combining files");
        let outcome = self.run_rounds().await;
        self.state = if outcome.is_ok() {
            ReducerState::Done
        } else {
            ReducerState::Failed
        };

        let cleanup = self.scratch.cleanup().await;
        match (outcome, cleanup) {
            (Ok(path), Ok(())) => Ok(path),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                warn!("Failed to clean up after merge failure: {}", cleanup_err);
                Err(e)
            }
        }
    }

    async fn run_rounds(&mut self) -> MergeResult<PathBuf> {
        let mut inputs = std::mem::take(&mut self.inputs);
        let mut round = 0;
        debug!(
            "Merging {} files {} at a time, at most {} round(s)",
            inputs.len(),
            self.batch_size,
            rounds_needed(inputs.len(), self.batch_size)
        );

        loop {
            self.state = ReducerState::Round(round);
            let outputs = self.run_round(round, &inputs).await?;

            if outputs.is_empty() {
                return Err(MergeError::execution(format!(
                    "Round {} produced no output files",
                    round
                )));
            }
            if outputs.len() == 1 {
                break self.finalize(&outputs[0]).await;
            }
            inputs = outputs;
            round += 1;
        }
    }

    async fn run_round(&mut self, round: usize, inputs: &[PathBuf]) -> MergeResult<Vec<PathBuf>> {
        let round_dir = self.scratch.create_round_dir(round)?;
        let jobs = self.partitioner.partition(&round_dir, inputs);
        debug!(
            "Round {}: {} file(s) in {} job(s), writing to {}",
            round,
            inputs.len(),
            jobs.len(),
            round_dir.display()
        );

        let expected: Vec<PathBuf> = jobs.iter().map(|job| job.output_path.clone()).collect();
        self.executor.execute(round, jobs).await?;

        let produced = list_round_outputs(&round_dir)?;
        if let Some(missing) = expected.iter().find(|path| !produced.contains(path)) {
            return Err(MergeError::execution(format!(
                "Merge tool reported success but did not create {}",
                missing.display()
            )));
        }
        for extra in produced.iter().filter(|path| !expected.contains(path)) {
            debug!(
                "Ignoring unexpected file in round {} directory: {}",
                round,
                extra.display()
            );
        }
        Ok(expected)
    }

    async fn finalize(&mut self, survivor: &Path) -> MergeResult<PathBuf> {
        self.state = ReducerState::Finalize;
        info!(
            "Copying final file: {} --> {}",
            survivor.display(),
            self.destination.display()
        );
        copy_preserving(survivor, &self.destination).await?;
        Ok(self.destination.clone())
    }
}
