use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("node {0:?} not found")]
    NodeNotFound(String),

    #[error("node update conflict: {0}")]
    Conflict(String),

    #[error("kubernetes api error: {0}")]
    Api(String),

    #[error("reconcile pass timed out after {0:?}")]
    Timeout(Duration),

    #[error("reconcile pass canceled")]
    Canceled,

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("instance watcher stopped unexpectedly: {0}")]
    WatcherStopped(String),
}

impl CoreError {
    /// Short, bounded name of the error kind (used as a metrics label).
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::InvalidInput(_) => "invalid_input",
            CoreError::Config(_) => "config",
            CoreError::NodeNotFound(_) => "node_not_found",
            CoreError::Conflict(_) => "conflict",
            CoreError::Api(_) => "api",
            CoreError::Timeout(_) => "timeout",
            CoreError::Canceled => "canceled",
            CoreError::Metadata(_) => "metadata",
            CoreError::WatcherStopped(_) => "watcher_stopped",
        }
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Http(String),

    #[error("metadata service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode metadata response: {0}")]
    Decode(String),

    #[error("failed to obtain metadata token: {0}")]
    Token(String),

    #[error("metadata request timed out after {0:?}")]
    Timeout(Duration),
}
