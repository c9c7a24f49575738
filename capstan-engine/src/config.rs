//! Engine configuration
//!
//! All paths are explicit constructor parameters rather than process-wide
//! globals, so multiple engines with different work roots can coexist in one
//! process (useful for testing).

use std::path::PathBuf;

use crate::error::{Result, TaskerError};

/// Default host directory under which per-task working directories live
const DEFAULT_WORK_ROOT: &str = "/var/lib/capstan";

/// Configuration for a task engine instance
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Host directory holding one subdirectory per task, named by service id
    pub work_root: PathBuf,
}

impl EngineConfig {
    /// Creates a configuration with an explicit work root
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - CAPSTAN_WORK_ROOT (optional, default: /var/lib/capstan)
    pub fn from_env() -> Self {
        let work_root = std::env::var("CAPSTAN_WORK_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORK_ROOT));
        Self { work_root }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.work_root.as_os_str().is_empty() {
            return Err(TaskerError::Config("work_root cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_ROOT)
    }
}
