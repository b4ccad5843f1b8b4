//! # ahadd
//!
//! Merge an unbounded number of data files with an external merge tool
//! (`hadd` by default) that cannot take them all in one invocation.
//!
//! ## Usage
//!
//! ```bash
//! ahadd [-n files-per-merge] [-j jobs] [-t tmpdir] [-s] [-f] output.root input*.root
//! ```
//!
//! Inputs are split into batches, each batch is merged by one tool process,
//! and the partial outputs are merged again round after round until a single
//! file remains, which is copied to the destination.
//!
//! ## Modules
//!
//! - `app` - Logging, fatal error reporting and the startup sequence
//! - `cli` - Command-line arguments and their translation into a configuration
//! - `config` - Merge run configuration and parallelism detection
//! - `error` - Unified error type and exit codes
//! - `reduce` - Partitioning, job execution, scratch storage and the round loop
//! - `subprocess` - Subprocess abstraction layer with a mock for testing
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod reduce;
pub mod subprocess;

pub use config::{MergeConfig, Parallelism};
pub use error::{MergeError, MergeResult};
pub use reduce::{BatchReducer, ChunkJob, Partitioner};
