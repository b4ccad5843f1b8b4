//! Error handling utilities
//!
//! This module provides centralized error handling for the application.

use crate::error::{ExitCode, MergeError};
use tracing::error;

/// Handle fatal errors and exit with appropriate status code
///
/// - For `MergeError`: shows the user message always, the developer message
///   (code description, tool stderr, source chain) in verbose mode, and
///   exits with the error's own exit code
/// - For other errors: shows the message and chain, exits with 1
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    let exit_code = if let Some(merge_err) = error.downcast_ref::<MergeError>() {
        eprintln!("{}", merge_err.user_message());

        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", merge_err.developer_message());
        }

        merge_err.exit_code()
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }

        ExitCode::GENERAL_ERROR
    };

    std::process::exit(exit_code)
}
