//! In-memory Tasker fake
//!
//! Test double for the capability contract: tracks tasks in a map keyed by
//! service id and lets tests script status transitions, log lines, progress
//! text and outputs without a container runtime. Mirrors the production
//! engine's guards (nil operation, identifier policy, duplicate input names)
//! so callers exercise the same error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use capstan_core::domain::{
    OperationStatus, ServiceOperation, data_items_to_map, ensure_unique_names,
};

use crate::error::{Result, TaskerError};
use crate::ident::validate_id;
use crate::tasker::{Tasker, service_id};

#[derive(Debug, Clone, Default)]
struct FakeTask {
    status: OperationStatus,
    logs: String,
    progress: Option<String>,
    outputs: Option<HashMap<String, Vec<String>>>,
    input: HashMap<String, Vec<String>>,
}

/// In-memory implementation of [`Tasker`]
///
/// Thread-safe; clones of the handle are not needed because all interior
/// state sits behind a mutex.
#[derive(Debug)]
pub struct InMemoryTasker {
    tasks: Mutex<HashMap<String, FakeTask>>,
    available: AtomicBool,
}

impl InMemoryTasker {
    /// Creates an empty, available fake
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Scripts the availability probe
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Scripts the status a task reports
    pub fn set_status(&self, id: &str, status: OperationStatus) {
        if let Some(task) = self.tasks.lock().unwrap().get_mut(id) {
            task.status = status;
        }
    }

    /// Overwrites the progress text, as a container write would
    pub fn set_progress(&self, id: &str, progress: &str) {
        if let Some(task) = self.tasks.lock().unwrap().get_mut(id) {
            task.progress = Some(progress.to_string());
        }
    }

    /// Scripts the output map a task reports
    pub fn set_outputs(&self, id: &str, outputs: HashMap<String, Vec<String>>) {
        if let Some(task) = self.tasks.lock().unwrap().get_mut(id) {
            task.outputs = Some(outputs);
        }
    }

    /// Appends a line to the task's log buffer
    pub fn push_log(&self, id: &str, line: &str) {
        if let Some(task) = self.tasks.lock().unwrap().get_mut(id) {
            task.logs.push_str(line);
            task.logs.push('\n');
        }
    }

    /// True if a task with this id is currently tracked
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.lock().unwrap().contains_key(id)
    }

    /// The input map captured when the task was run
    pub fn input(&self, id: &str) -> Option<HashMap<String, Vec<String>>> {
        self.tasks.lock().unwrap().get(id).map(|t| t.input.clone())
    }

    fn with_task<T>(&self, id: &str, f: impl FnOnce(&FakeTask) -> T) -> Result<T> {
        let tasks = self.tasks.lock().unwrap();
        tasks
            .get(id)
            .map(f)
            .ok_or_else(|| TaskerError::NotFound(id.to_string()))
    }
}

impl Default for InMemoryTasker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tasker for InMemoryTasker {
    async fn available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn run(&self, op: &ServiceOperation) -> Result<()> {
        let id = service_id(op)?;
        validate_id(id)?;
        ensure_unique_names(&op.service.input)?;

        let mut tasks = self.tasks.lock().unwrap();
        if tasks.contains_key(id) {
            return Err(TaskerError::AlreadyRunning(id.to_string()));
        }
        tasks.insert(
            id.to_string(),
            FakeTask {
                status: OperationStatus::Running,
                input: data_items_to_map(&op.service.input),
                ..FakeTask::default()
            },
        );
        Ok(())
    }

    async fn stop(&self, op: &ServiceOperation, _timeout: Duration) -> Result<()> {
        let id = service_id(op)?;
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.get_mut(id) {
            Some(task) => {
                // Stopping an already-stopped task stays quiet, like the
                // runtime does
                if !task.status.is_terminal() {
                    task.status = OperationStatus::Stopped;
                }
                Ok(())
            }
            None => Err(TaskerError::NotFound(id.to_string())),
        }
    }

    async fn remove(&self, op: &ServiceOperation) -> Result<()> {
        let id = service_id(op)?;
        validate_id(id)?;
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.remove(id) {
            Some(_) => Ok(()),
            None => Err(TaskerError::NotFound(id.to_string())),
        }
    }

    async fn status(&self, op: &ServiceOperation) -> Result<OperationStatus> {
        let id = service_id(op)?;
        self.with_task(id, |task| task.status)
    }

    async fn logs(&self, op: &ServiceOperation) -> Result<String> {
        let id = service_id(op)?;
        self.with_task(id, |task| task.logs.clone())
    }

    async fn progress(&self, op: &ServiceOperation) -> Result<String> {
        let id = service_id(op)?;
        self.with_task(id, |task| task.progress.clone())?
            .ok_or_else(|| TaskerError::NotFound(id.to_string()))
    }

    async fn outputs(&self, op: &ServiceOperation) -> Result<HashMap<String, Vec<String>>> {
        let id = service_id(op)?;
        self.with_task(id, |task| task.outputs.clone())?
            .ok_or_else(|| TaskerError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capstan_core::domain::{OperationKind, Plugin, Service, ServiceDataItem};
    use capstan_core::generate_id;

    fn operation(id: &str) -> ServiceOperation {
        ServiceOperation::new(
            OperationKind::Deploy,
            Plugin::default(),
            Service {
                id: id.to_string(),
                ..Service::default()
            },
        )
    }

    fn item(name: &str, values: &[&str]) -> ServiceDataItem {
        ServiceDataItem {
            name: name.to_string(),
            value: values.iter().map(|v| v.to_string()).collect(),
            ..ServiceDataItem::default()
        }
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let tasker = InMemoryTasker::new();
        let id = format!("Test{}", generate_id());
        let mut op = operation(&id);
        op.service.input = vec![item("width", &["640"])];

        tasker.run(&op).await.unwrap();
        assert_eq!(tasker.status(&op).await.unwrap(), OperationStatus::Running);
        assert_eq!(
            tasker.input(&id).unwrap()["width"],
            vec!["640".to_string()]
        );

        tasker.push_log(&id, "blah");
        tasker.set_progress(&id, "blahblah");
        tasker.set_progress(&id, "blahblahblah");

        assert_eq!(tasker.logs(&op).await.unwrap(), "blah\n");
        // Latest progress write wins
        assert_eq!(tasker.progress(&op).await.unwrap(), "blahblahblah");

        tasker.stop(&op, Duration::from_secs(1)).await.unwrap();
        assert_eq!(tasker.status(&op).await.unwrap(), OperationStatus::Stopped);

        tasker.remove(&op).await.unwrap();
        assert!(!tasker.contains(&id));
        assert!(matches!(
            tasker.status(&op).await.unwrap_err(),
            TaskerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_nil_operation_guard() {
        let tasker = InMemoryTasker::new();
        let op = ServiceOperation::default();

        assert!(matches!(
            tasker.run(&op).await.unwrap_err(),
            TaskerError::NilOperation
        ));
        assert!(matches!(
            tasker.remove(&op).await.unwrap_err(),
            TaskerError::NilOperation
        ));
        assert!(matches!(
            tasker.status(&op).await.unwrap_err(),
            TaskerError::NilOperation
        ));
    }

    #[tokio::test]
    async fn test_malformed_ids_rejected() {
        let tasker = InMemoryTasker::new();
        for id in ["../test2234", "~/test23", "/test23"] {
            let op = operation(id);
            assert!(matches!(
                tasker.run(&op).await.unwrap_err(),
                TaskerError::MalformedId(_)
            ));
            assert!(matches!(
                tasker.remove(&op).await.unwrap_err(),
                TaskerError::MalformedId(_)
            ));
            assert!(!tasker.contains(id));
        }
    }

    #[tokio::test]
    async fn test_duplicate_input_names_rejected() {
        let tasker = InMemoryTasker::new();
        let mut op = operation("svc-1");
        op.service.input = vec![item("a", &["1"]), item("a", &["2"])];

        assert!(matches!(
            tasker.run(&op).await.unwrap_err(),
            TaskerError::Model(_)
        ));
        assert!(!tasker.contains("svc-1"));
    }

    #[tokio::test]
    async fn test_run_twice_is_rejected() {
        let tasker = InMemoryTasker::new();
        let op = operation("svc-1");
        tasker.run(&op).await.unwrap();
        assert!(matches!(
            tasker.run(&op).await.unwrap_err(),
            TaskerError::AlreadyRunning(_)
        ));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let tasker = InMemoryTasker::new();
        let op = operation("svc-1");
        tasker.run(&op).await.unwrap();

        tasker.stop(&op, Duration::from_secs(1)).await.unwrap();
        tasker.stop(&op, Duration::from_secs(1)).await.unwrap();
        assert_eq!(tasker.status(&op).await.unwrap(), OperationStatus::Stopped);
    }

    #[tokio::test]
    async fn test_outputs_unset_until_scripted() {
        let tasker = InMemoryTasker::new();
        let op = operation("svc-1");
        tasker.run(&op).await.unwrap();

        assert!(matches!(
            tasker.outputs(&op).await.unwrap_err(),
            TaskerError::NotFound(_)
        ));

        let mut outputs = HashMap::new();
        outputs.insert("key1".to_string(), vec!["value1".to_string()]);
        tasker.set_outputs("svc-1", outputs.clone());
        assert_eq!(tasker.outputs(&op).await.unwrap(), outputs);
    }

    #[tokio::test]
    async fn test_availability_probe() {
        let tasker = InMemoryTasker::new();
        assert!(tasker.available().await);
        tasker.set_available(false);
        assert!(!tasker.available().await);
    }
}
