//! Capstan Engine
//!
//! Container-backed execution engine for service operations.
//!
//! Architecture:
//! - Capability contract: the [`Tasker`] trait callers program against
//! - Task engine: [`DockerTasker`], the Docker Engine API implementation
//! - Side channel: per-task host working directory carrying `input`,
//!   `progress` and `output` files, bound into the container
//! - Status translation: pure mapping from runtime state to
//!   [`OperationStatus`]
//! - Stream reader: cancellable, fully-buffering reader for log and
//!   image-pull streams
//!
//! The engine is stateless across instances: everything is keyed by the
//! service id, so a restarted process can resume observing and controlling
//! in-flight tasks.

pub mod config;
pub mod docker;
pub mod error;
pub mod ident;
pub mod memory;
pub mod status;
pub mod stream;
pub mod tasker;
pub mod workdir;

pub use config::EngineConfig;
pub use docker::DockerTasker;
pub use error::{Result, TaskerError};
pub use memory::InMemoryTasker;
pub use tasker::Tasker;

// Re-export the model types that appear in the contract's signatures
pub use capstan_core::domain::{OperationKind, OperationStatus, ServiceOperation};
