//! Command-line interface
//!
//! Parses arguments, turns them into a [`MergeConfig`] and runs the merge.

pub mod args;

pub use args::Cli;

use crate::app::runtime::{merge_files, resolve_tool};
use crate::config::{MergeConfig, Parallelism};
use crate::subprocess::SubprocessManager;
use anyhow::Result;
use tracing::info;

/// Build the merge configuration for an already resolved tool
pub fn build_config(cli: &Cli, tool: std::path::PathBuf, parallelism: Parallelism) -> MergeConfig {
    let mut config = MergeConfig::new(tool, parallelism)
        .with_batch_size(cli.n_files_at_once)
        .with_scratch_parent(cli.temp_dir.clone())
        .with_save_scratch(cli.save_temp)
        .with_force_overwrite(cli.force_overwrite)
        .with_extension_from(&cli.output_file);
    if let Some(jobs) = cli.jobs {
        config = config.with_jobs(jobs);
    }
    config
}

/// Run the merge described by `cli`
pub async fn execute(cli: Cli) -> Result<()> {
    let tool = resolve_tool(&cli.tool)?;
    let config = build_config(&cli, tool, Parallelism::detect());

    let manager = SubprocessManager::production();
    let destination = merge_files(&config, &cli.output_file, cli.input_files, manager.runner()).await?;

    info!("Merged output written to {}", destination.display());
    Ok(())
}
