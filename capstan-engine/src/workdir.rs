//! Host-container side-channel protocol
//!
//! Each task gets one host directory named after its service id, bound into
//! the container at a fixed path. Three files flow through it:
//! - `input`: written by the engine before start (JSON, name -> values)
//! - `progress`: written by the container, free-form text, latest write wins
//! - `output`: written by the container (JSON, name -> values)
//!
//! Reads are plain byte reads with no locking or partial-write protection;
//! callers must tolerate reading a file mid-write. Removing a task deletes
//! the whole directory; there is no archival step.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// Fixed path at which the working directory is mounted inside the container
pub const CONTAINER_DATA_DIR: &str = "/var/lib/capstan";

const INPUT_FILE: &str = "input";
const PROGRESS_FILE: &str = "progress";
const OUTPUT_FILE: &str = "output";

/// Per-engine root under which one directory per task lives
///
/// Holds no state beyond the root path, so any number of `WorkDir` instances
/// (in any number of processes) can observe the same tasks.
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Creates a handle rooted at the given path; does not touch the disk
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ensures the root directory itself exists
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Path of the per-task directory for a service id
    pub fn task_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Bind-mount specification mapping the task directory to the
    /// in-container data path
    pub fn bind_spec(&self, id: &str) -> String {
        format!("{}:{}", self.task_dir(id).display(), CONTAINER_DATA_DIR)
    }

    /// Creates the task directory and writes the `input` file
    pub async fn prepare(&self, id: &str, input: &HashMap<String, Vec<String>>) -> Result<()> {
        let dir = self.task_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        let encoded = serde_json::to_vec(input)?;
        tokio::fs::write(dir.join(INPUT_FILE), encoded).await?;
        debug!("prepared working directory {}", dir.display());
        Ok(())
    }

    /// Reads the current `progress` text as written by the container
    pub async fn progress(&self, id: &str) -> Result<String> {
        let bytes = tokio::fs::read(self.task_dir(id).join(PROGRESS_FILE)).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads and decodes the `output` file
    pub async fn outputs(&self, id: &str) -> Result<HashMap<String, Vec<String>>> {
        let bytes = tokio::fs::read(self.task_dir(id).join(OUTPUT_FILE)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Deletes the task directory and everything in it
    ///
    /// Succeeds if the directory is already gone.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let dir = self.task_dir(id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!("removed working directory {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Root path this instance manages
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskerError;

    fn input_map(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[tokio::test]
    async fn test_prepare_writes_input() {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = WorkDir::new(tmp.path());

        let input = input_map(&[("width", &["640"]), ("tags", &["a", "b"])]);
        workdir.prepare("svc-1", &input).await.unwrap();

        let raw = std::fs::read(tmp.path().join("svc-1").join("input")).unwrap();
        let decoded: HashMap<String, Vec<String>> = serde_json::from_slice(&raw).unwrap();
        assert_eq!(decoded, input);
    }

    #[tokio::test]
    async fn test_progress_last_write_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = WorkDir::new(tmp.path());
        workdir.prepare("svc-1", &HashMap::new()).await.unwrap();

        let progress_path = tmp.path().join("svc-1").join("progress");
        std::fs::write(&progress_path, "blahblah").unwrap();
        std::fs::write(&progress_path, "blahblahblah").unwrap();

        assert_eq!(workdir.progress("svc-1").await.unwrap(), "blahblahblah");
    }

    #[tokio::test]
    async fn test_outputs_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = WorkDir::new(tmp.path());
        workdir.prepare("svc-1", &HashMap::new()).await.unwrap();

        let outputs = input_map(&[("key1", &["value1"]), ("out", &["put"])]);
        std::fs::write(
            tmp.path().join("svc-1").join("output"),
            serde_json::to_vec(&outputs).unwrap(),
        )
        .unwrap();

        assert_eq!(workdir.outputs("svc-1").await.unwrap(), outputs);
    }

    #[tokio::test]
    async fn test_outputs_round_trip_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = WorkDir::new(tmp.path());
        workdir.prepare("svc-1", &HashMap::new()).await.unwrap();

        std::fs::write(tmp.path().join("svc-1").join("output"), b"{}").unwrap();
        assert!(workdir.outputs("svc-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outputs_malformed_json() {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = WorkDir::new(tmp.path());
        workdir.prepare("svc-1", &HashMap::new()).await.unwrap();

        std::fs::write(tmp.path().join("svc-1").join("output"), b"not json").unwrap();
        let err = workdir.outputs("svc-1").await.unwrap_err();
        assert!(matches!(err, TaskerError::Decode(_)));
    }

    #[tokio::test]
    async fn test_remove_deletes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = WorkDir::new(tmp.path());
        workdir.prepare("svc-1", &HashMap::new()).await.unwrap();
        assert!(tmp.path().join("svc-1").exists());

        workdir.remove("svc-1").await.unwrap();
        assert!(!tmp.path().join("svc-1").exists());

        // Removing again is not an error
        workdir.remove("svc-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_two_instances_share_a_root() {
        // A second instance over the same root sees tasks the first prepared
        let tmp = tempfile::tempdir().unwrap();
        let first = WorkDir::new(tmp.path());
        let second = WorkDir::new(tmp.path());

        first.prepare("svc-1", &HashMap::new()).await.unwrap();
        std::fs::write(tmp.path().join("svc-1").join("progress"), "halfway").unwrap();

        assert_eq!(second.progress("svc-1").await.unwrap(), "halfway");
        assert_eq!(second.bind_spec("svc-1"), first.bind_spec("svc-1"));
    }

    #[test]
    fn test_bind_spec_targets_fixed_container_path() {
        let workdir = WorkDir::new("/var/lib/capstan");
        assert_eq!(
            workdir.bind_spec("svc-1"),
            "/var/lib/capstan/svc-1:/var/lib/capstan"
        );
    }
}
