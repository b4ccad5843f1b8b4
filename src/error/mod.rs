use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod codes;


pub use codes::{describe_error_code, ErrorCode, ExitCode};

/// Result alias used throughout the merge pipeline
pub type MergeResult<T> = Result<T, MergeError>;

/// The unified error type for ahadd
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Output file already exists: {}", .path.display())]
    DestinationExists { path: PathBuf },

    #[error("Requested to merge {batch_size} or fewer files per iteration; this will never converge")]
    InvalidBatchSize { batch_size: usize },

    #[error("No input files to merge")]
    NoInputFiles,

    #[error("Can not find merge tool '{tool}' on PATH")]
    ToolNotFound { tool: String },

    #[error(
        "Merge tool failed in round {round} on files {start}-{end} of {total} (output {}): {}",
        .output.display(),
        describe_status(.exit_code)
    )]
    ToolFailed {
        round: usize,
        start: usize,
        end: usize,
        total: usize,
        output: PathBuf,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Execution error: {message}")]
    Execution {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn describe_status(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit status {}", code),
        None => "terminated without an exit status".to_string(),
    }
}

impl MergeError {
    /// Create a storage error for a failed filesystem operation on `path`
    pub fn storage(code: u16, message: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        Self::Storage {
            code,
            message: format!("{} ({})", message.into(), path.display()),
            path: Some(path.to_path_buf()),
            source: Some(source),
        }
    }

    /// Create an execution error with default code
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to an execution error
    pub fn with_source(mut self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        if let Self::Execution { source: src, .. } = &mut self {
            *src = Some(source.into());
        }
        self
    }

    /// Get the registry code for this error
    pub fn code(&self) -> u16 {
        match self {
            Self::DestinationExists { .. } => ErrorCode::CONFIG_DESTINATION_EXISTS,
            Self::InvalidBatchSize { .. } => ErrorCode::CONFIG_INVALID_BATCH_SIZE,
            Self::NoInputFiles => ErrorCode::CONFIG_NO_INPUTS,
            Self::ToolNotFound { .. } => ErrorCode::EXEC_COMMAND_NOT_FOUND,
            Self::ToolFailed { .. } => ErrorCode::EXEC_SUBPROCESS_FAILED,
            Self::Storage { code, .. } => *code,
            Self::Execution { .. } => ErrorCode::EXEC_GENERIC,
        }
    }

    /// Get the process exit code for this error
    ///
    /// A failing merge tool propagates its own status so callers can tell
    /// which failure happened; statuses that do not fit a process exit code
    /// collapse to the general error code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolNotFound { .. } => ExitCode::TOOL_NOT_FOUND,
            Self::ToolFailed {
                exit_code: Some(code),
                ..
            } if (1..=255).contains(code) => *code,
            _ => ExitCode::GENERAL_ERROR,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        format!("[E{:04}] {}", self.code(), self)
    }

    /// Get a detailed developer message including the source chain
    pub fn developer_message(&self) -> String {
        let mut msg = format!("{}\n  code: {} ({})", self, self.code(), describe_error_code(self.code()));

        if let Self::ToolFailed { stderr, .. } = self {
            if !stderr.trim().is_empty() {
                msg.push_str(&format!("\n  tool stderr:\n{}", stderr.trim_end()));
            }
        }

        let mut current: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(self);
        while let Some(source) = current {
            msg.push_str(&format!("\n  caused by: {}", source));
            current = source.source();
        }
        msg
    }
}
