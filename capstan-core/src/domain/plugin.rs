//! Plugin domain types
//!
//! A plugin is the template for service operations: it names a container
//! image and declares the inputs the image expects and the outputs it
//! produces. Operations snapshot the plugin at invocation time, so a plugin
//! is effectively immutable once referenced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::domain::Metadata;

/// Template describing a container image and its I/O schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    pub name: String,

    pub summary: String,
    pub description: String,
    pub maintainer: String,
    pub version: String,

    /// Container image reference (e.g. "registry.example.com/tool:1.2")
    pub image: String,

    /// Declared input schema
    pub input: Vec<PluginDataItem>,

    /// Declared output schema
    pub output: Vec<PluginDataItem>,

    /// Free-form configuration; the engine consumes the `env` key as a list
    /// of KEY=VALUE strings injected into the container
    pub config: HashMap<String, Value>,

    #[serde(default)]
    pub metadata: Metadata,
}

/// One declared input or output of a plugin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginDataItem {
    pub name: String,

    /// Declared type of the item (opaque to the engine)
    #[serde(rename = "type")]
    pub item_type: String,

    /// Default value(s); empty if none specified
    #[serde(default)]
    pub default: Vec<String>,
}
