//! Core domain types
//!
//! This module contains the structures shared between the scheduler side
//! (which decides when operations happen) and the execution engine (which
//! carries them out). They are plain data: all behavior beyond projection
//! helpers lives elsewhere.

pub mod metadata;
pub mod operation;
pub mod plugin;
pub mod service;

pub use metadata::Metadata;
pub use operation::{OperationKind, OperationStatus, ServiceOperation};
pub use plugin::{Plugin, PluginDataItem};
pub use service::{Service, ServiceDataItem, ServiceStatus, data_items_to_map, ensure_unique_names};
