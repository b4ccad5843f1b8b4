//! Common test utilities and helpers

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stand-in for `hadd`: concatenates the inputs into the output
pub const CONCAT_TOOL: &str = "#!/bin/sh\nout=\"$1\"\nshift\ncat \"$@\" > \"$out\"\n";

/// Stand-in for a merge tool that always fails
pub const FAILING_TOOL: &str = "#!/bin/sh\necho \"cannot merge $1\" >&2\nexit 7\n";

/// Isolated directory with inputs, a scratch parent and a private `PATH`
pub struct MergeFixture {
    temp_dir: TempDir,
}

impl MergeFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["bin", "scratch", "data"] {
            fs::create_dir(temp_dir.path().join(dir)).unwrap();
        }
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.path().join("bin")
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.path().join("scratch")
    }

    /// Install an executable script named `name` on the fixture's `PATH`
    pub fn with_tool(self, name: &str, script: &str) -> Self {
        let path = self.bin_dir().join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    /// Write one input file per entry of `contents`, in order
    pub fn inputs(&self, contents: &[&str]) -> Vec<PathBuf> {
        contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let path = self.path().join("data").join(format!("in{:04}.root", i));
                fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    pub fn output(&self) -> PathBuf {
        self.path().join("out.root")
    }

    pub fn scratch_entries(&self) -> Vec<PathBuf> {
        fs::read_dir(self.scratch_dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    /// `ahadd` with `PATH` limited to the fixture's tools plus the system
    /// directories the scripts need
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("ahadd").unwrap();
        let path = format!("{}:/bin:/usr/bin", self.bin_dir().display());
        cmd.env("PATH", path).env_remove("RUST_LOG");
        cmd
    }

    /// `ahadd` with a `PATH` that contains no merge tool at all
    pub fn command_without_tools(&self) -> Command {
        let mut cmd = Command::cargo_bin("ahadd").unwrap();
        cmd.env("PATH", self.bin_dir()).env_remove("RUST_LOG");
        cmd
    }
}
