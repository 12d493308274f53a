//! Error types for the agent crate.

use thiserror::Error;

/// Errors that can occur while invoking the delegated agent.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The agent process could not be started.
    #[error("failed to spawn agent process: {0}")]
    Spawn(#[source] std::io::Error),

    /// Reading the agent's output failed.
    #[error("agent I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The agent process exited unsuccessfully before reporting a result.
    #[error("agent process failed: {0}")]
    ProcessFailed(String),

    /// Serialization of the runtime configuration failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
