//! Capstan Core
//!
//! Object model for the Capstan task execution system.
//!
//! This crate contains:
//! - Domain types: Plugin, Service, ServiceOperation and their data items
//! - Shared status enums used by the scheduler and the execution engine
//!
//! Note: Execution logic lives in capstan-engine; persistence and scheduling
//! belong to surrounding components and are not modeled here.

pub mod domain;
pub mod error;

pub use error::{ModelError, Result};

use uuid::Uuid;

/// Generates a fresh identifier suitable for services and operations
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
