//! Running merge jobs
//!
//! A round's jobs run either one after another or on a bounded pool of
//! concurrent tool processes. Either way `execute` returns only once every
//! dispatched job has finished.

use crate::error::{MergeError, MergeResult};
use crate::reduce::partition::ChunkJob;
use crate::subprocess::{ProcessCommandBuilder, ProcessRunner};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// How a round's jobs are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Parallel(usize),
}

impl ExecutionMode {
    pub fn for_jobs(jobs: usize) -> Self {
        if jobs <= 1 {
            Self::Sequential
        } else {
            Self::Parallel(jobs)
        }
    }
}

pub struct Executor {
    runner: Arc<dyn ProcessRunner>,
    tool: PathBuf,
    mode: ExecutionMode,
}

impl Executor {
    pub fn new(runner: Arc<dyn ProcessRunner>, tool: impl Into<PathBuf>, jobs: usize) -> Self {
        Self {
            runner,
            tool: tool.into(),
            mode: ExecutionMode::for_jobs(jobs),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Run every job of `round` to completion.
    ///
    /// The first failure stops further dispatch; jobs already running are
    /// waited for before that failure is returned.
    pub async fn execute(&self, round: usize, jobs: Vec<ChunkJob>) -> MergeResult<()> {
        match self.mode {
            ExecutionMode::Sequential => self.execute_sequential(round, jobs).await,
            ExecutionMode::Parallel(workers) => self.execute_parallel(round, jobs, workers).await,
        }
    }

    async fn execute_sequential(&self, round: usize, jobs: Vec<ChunkJob>) -> MergeResult<()> {
        for job in jobs {
            run_chunk(self.runner.as_ref(), &self.tool, round, job).await?;
        }
        Ok(())
    }

    async fn execute_parallel(
        &self,
        round: usize,
        jobs: Vec<ChunkJob>,
        workers: usize,
    ) -> MergeResult<()> {
        let semaphore = Arc::new(Semaphore::new(workers));
        let failed = Arc::new(AtomicBool::new(false));
        let mut futures = FuturesUnordered::new();

        debug!(
            "Dispatching {} jobs for round {} across {} workers",
            jobs.len(),
            round,
            workers
        );

        for job in jobs {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| MergeError::execution("Worker pool closed").with_source(e))?;

            if failed.load(Ordering::SeqCst) {
                debug!("Not dispatching remaining jobs of round {} after a failure", round);
                break;
            }

            let runner = Arc::clone(&self.runner);
            let tool = self.tool.clone();
            let failed = Arc::clone(&failed);

            futures.push(tokio::spawn(async move {
                let result = run_chunk(runner.as_ref(), &tool, round, job).await;
                if result.is_err() {
                    failed.store(true, Ordering::SeqCst);
                }
                drop(permit);
                result
            }));
        }

        let mut first_error = None;
        while let Some(joined) = futures.next().await {
            let result = joined.unwrap_or_else(|e| {
                Err(MergeError::execution(format!("Merge task in round {} panicked", round))
                    .with_source(e))
            });
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Merge one chunk with a single tool invocation
pub async fn run_chunk(
    runner: &dyn ProcessRunner,
    tool: &std::path::Path,
    round: usize,
    job: ChunkJob,
) -> MergeResult<()> {
    info!(
        "Now merging files {}-{} of {}",
        job.start_index, job.end_index, job.total_in_round
    );
    debug!("Output: {}", job.output_path.display());
    for input in &job.input_paths {
        debug!("Input: {}", input.display());
    }

    let command = ProcessCommandBuilder::new(tool)
        .arg(&job.output_path)
        .args(&job.input_paths)
        .build();
    let output = runner.run(command).await?;

    if output.status.success() {
        return Ok(());
    }

    error!(
        "Error from merge tool on files {}-{} of {} in round {}",
        job.start_index, job.end_index, job.total_in_round, round
    );
    if !output.stderr.trim().is_empty() {
        error!("{}", output.stderr.trim_end());
    }

    Err(MergeError::ToolFailed {
        round,
        start: job.start_index,
        end: job.end_index,
        total: job.total_in_round,
        output: job.output_path,
        exit_code: output.status.code(),
        stderr: output.stderr,
    })
}
