//! Service domain types
//!
//! A service is a configured, named instance of a plugin. Its id doubles as
//! the container name and as the per-service working-directory name on the
//! host, which is what makes a restarted engine able to find the task again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::Metadata;
use crate::error::{ModelError, Result};

/// A configured instance of a plugin with resolved input/output values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier; also used as the container name and the host
    /// working-directory name
    pub id: String,
    pub name: String,

    pub enabled: bool,

    /// Id of the plugin this service instantiates
    pub plugin: String,

    pub status: ServiceStatus,

    /// Last time the service record was updated
    pub updated: Option<DateTime<Utc>>,

    pub input: Vec<ServiceDataItem>,
    pub output: Vec<ServiceDataItem>,

    #[serde(default)]
    pub metadata: Metadata,
}

/// Lifecycle status of a service record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Active,
    #[default]
    Inactive,
    Stopped,
    Failed,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Active => write!(f, "Active"),
            ServiceStatus::Inactive => write!(f, "Inactive"),
            ServiceStatus::Stopped => write!(f, "Stopped"),
            ServiceStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// One named input or output value of a service
///
/// Field names match the side-channel JSON representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDataItem {
    pub name: String,

    #[serde(rename = "type")]
    pub item_type: String,

    pub value: Vec<String>,

    /// Names of the items this value derives from
    #[serde(default)]
    pub from: Vec<String>,

    /// True once the value(s) have been resolved by an operation
    #[serde(default)]
    pub set: bool,
}

/// Projects an item-set into the canonical name -> values mapping
///
/// This is the format written to the `input` file and read back from the
/// `output` file. Duplicate names are not resolved here; callers that care
/// must run [`ensure_unique_names`] first.
pub fn data_items_to_map(items: &[ServiceDataItem]) -> HashMap<String, Vec<String>> {
    items
        .iter()
        .map(|item| (item.name.clone(), item.value.clone()))
        .collect()
}

/// Rejects item-sets that contain two items with the same name
pub fn ensure_unique_names(items: &[ServiceDataItem]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for item in items {
        if !seen.insert(item.name.as_str()) {
            return Err(ModelError::DuplicateItemName(item.name.clone()));
        }
    }
    Ok(())
}
