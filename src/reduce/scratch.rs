//! Scratch storage for intermediate merge outputs
//!
//! Layout: `<parent>/ahadd_<random>/<round>_<random>/input_<n>_<random>.<ext>`.
//! The root is owned by one reducer for one run.

use crate::error::{ErrorCode, MergeError, MergeResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ROOT_PREFIX: &str = "ahadd_";

#[derive(Debug)]
pub struct ScratchRoot {
    path: PathBuf,
    retain: bool,
}

impl ScratchRoot {
    /// Create a uniquely named scratch root under `parent`, or under the
    /// platform temp directory when no parent is given
    pub fn create(parent: Option<&Path>, retain: bool) -> MergeResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(ROOT_PREFIX);

        let created = match parent {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        };
        let dir = created.map_err(|e| {
            MergeError::storage(
                ErrorCode::STORAGE_SCRATCH_FAILED,
                "Failed to create scratch directory",
                parent.unwrap_or_else(|| Path::new("<temp dir>")),
                e,
            )
        })?;

        let path = dir.keep();
        debug!("Making temporary directory: {}", path.display());
        Ok(Self { path, retain })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn retains(&self) -> bool {
        self.retain
    }

    /// Create a fresh directory for round `round`
    pub fn create_round_dir(&self, round: usize) -> MergeResult<PathBuf> {
        tempfile::Builder::new()
            .prefix(&format!("{}_", round))
            .tempdir_in(&self.path)
            .map(|dir| dir.keep())
            .map_err(|e| {
                MergeError::storage(
                    ErrorCode::STORAGE_SCRATCH_FAILED,
                    format!("Failed to create directory for round {}", round),
                    &self.path,
                    e,
                )
            })
    }

    /// Remove the whole scratch root unless it is retained.
    ///
    /// Removing a root that is already gone succeeds, so this may be called
    /// more than once.
    pub async fn cleanup(&self) -> MergeResult<()> {
        if self.retain {
            info!("Keeping temporary files in {}", self.path.display());
            return Ok(());
        }

        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                debug!("Removed temporary directory {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MergeError::storage(
                ErrorCode::STORAGE_SCRATCH_FAILED,
                "Failed to remove scratch directory",
                &self.path,
                e,
            )),
        }
    }
}

/// List the files a round produced, sorted by name for stable progress output
pub fn list_round_outputs(round_dir: &Path) -> MergeResult<Vec<PathBuf>> {
    let io_err = |e: std::io::Error| {
        MergeError::storage(
            ErrorCode::STORAGE_IO_ERROR,
            "Failed to list round outputs",
            round_dir,
            e,
        )
    };

    let mut outputs = Vec::new();
    for entry in std::fs::read_dir(round_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_file() {
            outputs.push(entry.path());
        }
    }
    outputs.sort();
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_under_parent() {
        let parent = TempDir::new().unwrap();
        let root = ScratchRoot::create(Some(parent.path()), false).unwrap();

        assert!(root.path().is_dir());
        assert_eq!(root.path().parent(), Some(parent.path()));
        let name = root.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(ROOT_PREFIX));
    }

    #[test]
    fn test_concurrent_roots_do_not_collide() {
        let parent = TempDir::new().unwrap();
        let a = ScratchRoot::create(Some(parent.path()), false).unwrap();
        let b = ScratchRoot::create(Some(parent.path()), false).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_round_dirs_are_prefixed_by_index() {
        let parent = TempDir::new().unwrap();
        let root = ScratchRoot::create(Some(parent.path()), false).unwrap();

        let r0 = root.create_round_dir(0).unwrap();
        let r1 = root.create_round_dir(1).unwrap();

        assert!(r0.is_dir() && r1.is_dir());
        assert_eq!(r0.parent(), Some(root.path()));
        assert!(r0.file_name().unwrap().to_string_lossy().starts_with("0_"));
        assert!(r1.file_name().unwrap().to_string_lossy().starts_with("1_"));
    }

    #[test]
    fn test_missing_parent_is_reported() {
        let parent = TempDir::new().unwrap();
        let missing = parent.path().join("does-not-exist");
        let err = ScratchRoot::create(Some(&missing), false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::STORAGE_SCRATCH_FAILED);
    }

    #[tokio::test]
    async fn test_cleanup_removes_everything() {
        let parent = TempDir::new().unwrap();
        let root = ScratchRoot::create(Some(parent.path()), false).unwrap();
        let round = root.create_round_dir(0).unwrap();
        fs::write(round.join("input_0_abcdef.root"), b"data").unwrap();

        root.cleanup().await.unwrap();
        assert!(!root.path().exists());
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let parent = TempDir::new().unwrap();
        let root = ScratchRoot::create(Some(parent.path()), false).unwrap();

        root.cleanup().await.unwrap();
        root.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_after_manual_removal() {
        let parent = TempDir::new().unwrap();
        let root = ScratchRoot::create(Some(parent.path()), true).unwrap();

        fs::remove_dir_all(root.path()).unwrap();
        assert!(root.cleanup().await.is_ok());
    }

    #[tokio::test]
    async fn test_retained_root_survives_cleanup() {
        let parent = TempDir::new().unwrap();
        let root = ScratchRoot::create(Some(parent.path()), true).unwrap();
        assert!(root.retains());

        root.cleanup().await.unwrap();
        assert!(root.path().is_dir());
    }

    #[test]
    fn test_list_round_outputs_sorted_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("input_1_b.root"), b"1").unwrap();
        fs::write(dir.path().join("input_0_a.root"), b"0").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let outputs = list_round_outputs(dir.path()).unwrap();
        assert_eq!(
            outputs,
            vec![
                dir.path().join("input_0_a.root"),
                dir.path().join("input_1_b.root"),
            ]
        );
    }
}
