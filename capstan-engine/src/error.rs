//! Error types for the Capstan execution engine
//!
//! Every failure is returned to the caller as a distinct error kind; the
//! engine performs no retries and never swallows an error. Container runtime
//! failures are passed through verbatim in the `Runtime` variant.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, TaskerError>;

/// Errors that can occur when executing service operations
#[derive(Debug, Error)]
pub enum TaskerError {
    /// The operation or its service id was missing/empty
    #[error("nil service operation: missing service id")]
    NilOperation,

    /// The service id is unsafe for use as a path segment or container name
    #[error("malformed service id {0:?}: must not contain '.', '/' or '~'")]
    MalformedId(String),

    /// The runtime returned no inspectable state for the container
    #[error("unable to determine container state for {0:?}")]
    UnknownState(String),

    /// The task is not known to this tasker
    #[error("task not found: {0}")]
    NotFound(String),

    /// A task with this service id is already live
    #[error("task already running: {0}")]
    AlreadyRunning(String),

    /// The image pull stream reported a logical failure
    #[error("image pull failed: {0}")]
    Pull(String),

    /// The `output` side-channel file was not valid JSON
    #[error("malformed output file: {0}")]
    Decode(#[from] serde_json::Error),

    /// Container runtime error, passed through verbatim
    #[error("container runtime error: {0}")]
    Runtime(#[from] bollard::errors::Error),

    /// Host filesystem error on the working directory
    #[error("working directory I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model-level validation failure (e.g. duplicate input names)
    #[error(transparent)]
    Model(#[from] capstan_core::ModelError),

    /// Invalid engine configuration
    #[error("invalid engine configuration: {0}")]
    Config(String),

    /// The background stream-reader task failed to join
    #[error("stream reader task failed: {0}")]
    ReadTask(String),
}
