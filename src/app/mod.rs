//! Application module
//!
//! This module contains application-level functionality including:
//! - Verbosity handling
//! - Logging setup
//! - The startup sequence of a merge run
//! - Fatal error reporting

pub mod config;
pub mod error_handling;
pub mod logging;
pub mod runtime;

pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
pub use runtime::{merge_files, resolve_tool};
