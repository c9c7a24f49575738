//! Service operation domain types
//!
//! A service operation is one request to act on a service: it carries the
//! operation kind plus snapshots of the plugin and service taken when the
//! operation was created. The engine reads the snapshots only; the caller
//! records the outcome back into the live service record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Metadata, Plugin, Service};

/// One request to act on a service
///
/// Only one operation should be active at a time for a given service; the
/// scheduler that constructs operations is responsible for enforcing that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceOperation {
    pub kind: OperationKind,

    pub status: OperationStatus,

    pub created: Option<DateTime<Utc>>,
    pub started: Option<DateTime<Utc>>,

    /// Snapshot of the plugin at invocation time
    pub plugin: Plugin,

    /// Snapshot of the service at invocation time
    pub service: Service,

    #[serde(default)]
    pub metadata: Metadata,
}

impl ServiceOperation {
    /// Creates a new operation over snapshots of a plugin and service
    pub fn new(kind: OperationKind, plugin: Plugin, service: Service) -> Self {
        Self {
            kind,
            status: OperationStatus::Waiting,
            created: Some(Utc::now()),
            started: None,
            plugin,
            service,
            metadata: Metadata::new(),
        }
    }
}

/// What the operation asks the engine to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    #[default]
    Deploy,
    Status,
    Update,
    Destroy,
}

impl OperationKind {
    /// Stable string form, passed to the container as its leading argument
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Deploy => "Deploy",
            OperationKind::Status => "Status",
            OperationKind::Update => "Update",
            OperationKind::Destroy => "Destroy",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome classification of a service operation
///
/// The wire strings are part of the persisted/reported format: `Waiting`
/// reports as "Inactive" and `Failed` as "Error".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    #[default]
    #[serde(rename = "Inactive")]
    Waiting,
    Running,
    Finished,
    #[serde(rename = "Error")]
    Failed,
    Stopped,
    Unknown,
}

impl OperationStatus {
    /// Stable string form matching the serialized representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Waiting => "Inactive",
            OperationStatus::Running => "Running",
            OperationStatus::Finished => "Finished",
            OperationStatus::Failed => "Error",
            OperationStatus::Stopped => "Stopped",
            OperationStatus::Unknown => "Unknown",
        }
    }

    /// True once the operation can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Finished | OperationStatus::Failed | OperationStatus::Stopped
        )
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
