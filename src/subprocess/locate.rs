//! Executable lookup on `PATH`

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Locate `program` the way a shell would.
///
/// Names containing a path separator are checked directly; bare names are
/// searched for in each directory of `PATH`, in order.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    find_executable_in(program, std::env::var_os("PATH").as_deref())
}

/// Same as [`find_executable`] with an explicit search path
pub fn find_executable_in(program: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    std::env::split_paths(search_path?)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
