//! Free-form metadata carried by model objects

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Free-form key/value metadata attached to plugins, services and operations
///
/// Persisted alongside the object it decorates; the engine itself never
/// interprets metadata keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    entries: HashMap<String, Value>,
}

impl Metadata {
    /// Creates an empty metadata map
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a metadata value, replacing any previous value for the key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Looks up a metadata value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Looks up a metadata value and returns it only if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Returns true if no metadata has been set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut meta = Metadata::new();
        assert!(meta.is_empty());

        meta.set("owner", "scheduler");
        meta.set("attempt", 3);

        assert_eq!(meta.get_str("owner"), Some("scheduler"));
        assert_eq!(meta.get("attempt"), Some(&Value::from(3)));
        assert!(!meta.is_empty());
    }

    #[test]
    fn test_get_str_rejects_non_strings() {
        let mut meta = Metadata::new();
        meta.set("attempt", 3);

        assert_eq!(meta.get_str("attempt"), None);
        assert_eq!(meta.get_str("missing"), None);
    }

    #[test]
    fn test_set_overwrites() {
        let mut meta = Metadata::new();
        meta.set("owner", "a");
        meta.set("owner", "b");
        assert_eq!(meta.get_str("owner"), Some("b"));
    }
}
