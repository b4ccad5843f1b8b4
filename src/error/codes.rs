/// Error code registry for ahadd
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 3000-3999: Storage errors
/// - 4000-4999: Execution errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_DESTINATION_EXISTS: u16 = 1001;
    pub const CONFIG_INVALID_BATCH_SIZE: u16 = 1002;
    pub const CONFIG_NO_INPUTS: u16 = 1003;

    // Storage errors (3000-3999)
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_SCRATCH_FAILED: u16 = 3002;
    pub const STORAGE_COPY_FAILED: u16 = 3003;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4003;
}

/// Process exit codes reported by the binary
pub struct ExitCode;

impl ExitCode {
    pub const GENERAL_ERROR: i32 = 1;
    pub const TOOL_NOT_FOUND: i32 = 2;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1001 => "Destination file already exists",
        1002 => "Batch size must be greater than one",
        1003 => "No input files were given",
        3001 => "Filesystem I/O error",
        3002 => "Failed to manage scratch directory",
        3003 => "Failed to copy merged file to destination",
        4000 => "Generic execution error",
        4001 => "Merge tool not found on PATH",
        4003 => "Merge tool exited with a failure status",
        _ => "Unknown error",
    }
}
