//! The Tasker capability contract
//!
//! Everything above the engine programs against this trait, which decouples
//! callers from the concrete runtime backend. There are exactly two
//! implementations: the Docker-backed production engine and an in-memory fake
//! for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use capstan_core::domain::{OperationStatus, ServiceOperation};

use crate::error::{Result, TaskerError};

/// Capability of running tasks described by service operations
///
/// Every method keys purely off the operation's service id, so a freshly
/// constructed tasker can observe and control tasks started by a different
/// instance or process. The engine does not serialize concurrent operations
/// against the same id; callers must keep at most one operation active per
/// service.
#[async_trait]
pub trait Tasker: Send + Sync {
    /// Liveness probe of the underlying runtime connection
    ///
    /// Makes no distinction between correctable and permanent failures;
    /// callers that need resilience must retry with their own backoff.
    async fn available(&self) -> bool;

    /// Runs a service operation: prepares the working directory, pulls the
    /// image, then creates and starts the container
    ///
    /// No rollback on partial failure: if create succeeded but start failed,
    /// the container is left behind and the caller must call `remove`.
    async fn run(&self, op: &ServiceOperation) -> Result<()>;

    /// Requests a graceful stop, escalating to a kill after `timeout`
    async fn stop(&self, op: &ServiceOperation, timeout: Duration) -> Result<()>;

    /// Force-removes the container and deletes the working directory
    ///
    /// Directory deletion is attempted even when container removal fails.
    /// Irreversible; this is the only cleanup path.
    async fn remove(&self, op: &ServiceOperation) -> Result<()>;

    /// Classifies current runtime state into an operation status
    async fn status(&self, op: &ServiceOperation) -> Result<OperationStatus>;

    /// Returns the combined stdout/stderr of the container, fully buffered
    async fn logs(&self, op: &ServiceOperation) -> Result<String>;

    /// Reads the current `progress` text written by the container
    async fn progress(&self, op: &ServiceOperation) -> Result<String>;

    /// Reads and decodes the `output` map written by the container
    async fn outputs(&self, op: &ServiceOperation) -> Result<HashMap<String, Vec<String>>>;
}

/// Guards an operation and returns its service id
///
/// Every public operation starts here: an empty service id means the caller
/// handed us a nil operation.
pub(crate) fn service_id(op: &ServiceOperation) -> Result<&str> {
    let id = op.service.id.as_str();
    if id.is_empty() {
        return Err(TaskerError::NilOperation);
    }
    Ok(id)
}
