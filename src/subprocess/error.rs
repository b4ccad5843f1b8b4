use crate::error::MergeError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

/// Convert ProcessError to MergeError
impl From<ProcessError> for MergeError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::CommandNotFound(tool) => MergeError::ToolNotFound { tool },
            other => MergeError::execution(other.to_string()).with_source(other),
        }
    }
}
