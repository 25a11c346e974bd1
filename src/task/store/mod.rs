//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `file`: JSON snapshot on disk, rewritten on every add

mod file;
mod memory;

pub use file::FileTaskStore;
pub use memory::InMemoryTaskStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use super::task::{NewTask, Task, TaskId};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read task store {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse task store {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize task store: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write task store {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Task id space exhausted")]
    IdSpaceExhausted,
}

/// Store contents as a value: the ordered records plus the next id to assign.
///
/// This is also the on-disk layout of the file backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStoreSnapshot {
    pub tasks: Vec<Task>,
    pub id_counter: u64,
}

impl Default for TaskStoreSnapshot {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            id_counter: TaskId::FIRST.get(),
        }
    }
}

impl TaskStoreSnapshot {
    /// Append a record under the current counter.
    ///
    /// # Postcondition
    /// On success `id_counter` advanced by exactly one and the returned task
    /// is the last element of `tasks`. On failure nothing changed.
    pub fn push(&mut self, new_task: NewTask) -> Result<Task, StorageError> {
        let id = TaskId::new(self.id_counter);
        let next = id.next().ok_or(StorageError::IdSpaceExhausted)?;
        let task = new_task.with_id(id);
        self.tasks.push(task.clone());
        self.id_counter = next.get();
        Ok(task)
    }

    /// Lowest counter value consistent with the stored ids.
    fn min_counter(&self) -> u64 {
        self.tasks
            .iter()
            .map(|t| t.id.get().saturating_add(1))
            .max()
            .unwrap_or(TaskId::FIRST.get())
    }

    pub fn find_by_title(&self, title: &str, user_name: Option<&str>) -> Option<&Task> {
        self.tasks.iter().find(|task| {
            task.title == title && user_name.map_or(true, |user| task.user_name == user)
        })
    }
}

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Assign the next id and append the task.
    async fn add(&self, new_task: NewTask) -> Result<Task, StorageError>;

    /// All tasks in insertion (id) order.
    async fn list(&self) -> Result<Vec<Task>, StorageError>;

    /// First task with this exact title, optionally restricted to one user.
    async fn find_by_title(
        &self,
        title: &str,
        user_name: Option<&str>,
    ) -> Result<Option<Task>, StorageError>;

    /// The id the next `add` will assign.
    async fn next_id(&self) -> TaskId;
}

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    #[default]
    Memory,
    File,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "file" | "json" => Some(Self::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
        }
    }
}

/// Create a task store based on type and configuration.
pub async fn create_task_store(
    store_type: TaskStoreType,
    path: PathBuf,
) -> Result<Box<dyn TaskStore>, StorageError> {
    match store_type {
        TaskStoreType::Memory => Ok(Box::new(InMemoryTaskStore::new())),
        TaskStoreType::File => {
            let store = FileTaskStore::open(path).await?;
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::task::task::Priority;
    use chrono::NaiveDate;

    pub(crate) fn new_task(title: &str, user_name: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: Some("Test Task".to_string()),
            priority: Some(Priority::Level(3)),
            due_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            user_name: user_name.to_string(),
            location: None,
        }
    }

    #[test]
    fn test_snapshot_push_assigns_counter() {
        let mut snapshot = TaskStoreSnapshot::default();
        let first = snapshot.push(new_task("a", "u")).unwrap();
        let second = snapshot.push(new_task("b", "u")).unwrap();
        assert_eq!(first.id, TaskId::new(1));
        assert_eq!(second.id, TaskId::new(2));
        assert_eq!(snapshot.id_counter, 3);
    }

    #[test]
    fn test_snapshot_push_at_id_limit_leaves_state() {
        let mut snapshot = TaskStoreSnapshot {
            tasks: Vec::new(),
            id_counter: u64::MAX,
        };
        let err = snapshot.push(new_task("a", "u")).unwrap_err();
        assert!(matches!(err, StorageError::IdSpaceExhausted));
        assert!(snapshot.tasks.is_empty());
        assert_eq!(snapshot.id_counter, u64::MAX);
    }

    #[test]
    fn test_find_by_title_scoping() {
        let mut snapshot = TaskStoreSnapshot::default();
        snapshot.push(new_task("Report", "alice")).unwrap();
        assert!(snapshot.find_by_title("Report", None).is_some());
        assert!(snapshot.find_by_title("Report", Some("alice")).is_some());
        assert!(snapshot.find_by_title("Report", Some("bob")).is_none());
        assert!(snapshot.find_by_title("report", None).is_none());
    }

    #[test]
    fn test_store_type_parse() {
        assert_eq!(TaskStoreType::parse("memory"), Some(TaskStoreType::Memory));
        assert_eq!(TaskStoreType::parse("JSON"), Some(TaskStoreType::File));
        assert_eq!(TaskStoreType::parse("file"), Some(TaskStoreType::File));
        assert_eq!(TaskStoreType::parse("sqlite"), None);
    }

    #[tokio::test]
    async fn test_create_memory_store() {
        let store = create_task_store(TaskStoreType::Memory, PathBuf::from("unused.json"))
            .await
            .unwrap();
        assert!(!store.is_persistent());
        assert_eq!(store.next_id().await, TaskId::FIRST);
    }
}
