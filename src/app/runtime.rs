//! Startup sequence of a merge run
//!
//! Preconditions are checked before anything touches the filesystem:
//! tool lookup, batch size, then the destination. A lone input is copied
//! straight to the destination; anything else goes through the reducer.

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::reduce::{check_destination, copy_single_input, BatchReducer};
use crate::subprocess::{find_executable, ProcessRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Resolve the merge tool on `PATH`
pub fn resolve_tool(name: &str) -> MergeResult<PathBuf> {
    let path = find_executable(name).ok_or_else(|| MergeError::ToolNotFound {
        tool: name.to_string(),
    })?;
    debug!("Using merge tool {}", path.display());
    Ok(path)
}

/// Merge `inputs` into `destination` according to `config`.
///
/// `config.tool` must already be resolved.
pub async fn merge_files(
    config: &MergeConfig,
    destination: &Path,
    inputs: Vec<PathBuf>,
    runner: Arc<dyn ProcessRunner>,
) -> MergeResult<PathBuf> {
    config.validate()?;
    check_destination(destination, config.force_overwrite)?;

    if let [single] = inputs.as_slice() {
        copy_single_input(single, destination).await?;
        return Ok(destination.to_path_buf());
    }

    let mut reducer = BatchReducer::new(config, destination, inputs, runner)?;
    reducer.run().await
}
