//! In-memory task store (non-persistent).

use super::{StorageError, TaskStore, TaskStoreSnapshot};
use crate::task::task::{NewTask, Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<TaskStoreSnapshot>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::from_snapshot(TaskStoreSnapshot::default())
    }

    /// Start with the given counter instead of 1.
    pub fn with_next_id(next_id: TaskId) -> Self {
        Self::from_snapshot(TaskStoreSnapshot {
            tasks: Vec::new(),
            id_counter: next_id.get(),
        })
    }

    pub fn from_snapshot(snapshot: TaskStoreSnapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot)),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn add(&self, new_task: NewTask) -> Result<Task, StorageError> {
        let task = self.state.write().await.push(new_task)?;
        tracing::debug!("Task created: id={} title={:?}", task.id, task.title);
        Ok(task)
    }

    async fn list(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.state.read().await.tasks.clone())
    }

    async fn find_by_title(
        &self,
        title: &str,
        user_name: Option<&str>,
    ) -> Result<Option<Task>, StorageError> {
        Ok(self
            .state
            .read()
            .await
            .find_by_title(title, user_name)
            .cloned())
    }

    async fn next_id(&self) -> TaskId {
        TaskId::new(self.state.read().await.id_counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::store::tests::new_task;

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let store = InMemoryTaskStore::new();

        let first = store.add(new_task("Task 1", "user1")).await.unwrap();
        let second = store.add(new_task("Task 2", "user2")).await.unwrap();

        assert_eq!(first.id, TaskId::new(1));
        assert_eq!(second.id, TaskId::new(2));
        assert_eq!(store.list().await.unwrap(), vec![first, second]);
        assert_eq!(store.next_id().await, TaskId::new(3));
    }

    #[tokio::test]
    async fn test_duplicate_titles_get_distinct_ids() {
        let store = InMemoryTaskStore::new();

        let first = store.add(new_task("Duplicate", "dupe")).await.unwrap();
        let second = store.add(new_task("Duplicate", "dupe")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.title, second.title);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_is_repeatable() {
        let store = InMemoryTaskStore::new();
        store.add(new_task("a", "u")).await.unwrap();
        store.add(new_task("b", "u")).await.unwrap();

        let once = store.list().await.unwrap();
        let twice = store.list().await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_counter_near_i32_max() {
        let store = InMemoryTaskStore::with_next_id(TaskId::new(2_147_483_647));
        let task = store.add(new_task("Overflow Task", "overflow")).await.unwrap();
        assert_eq!(task.id, TaskId::new(2_147_483_647));
        assert_eq!(store.next_id().await, TaskId::new(2_147_483_648));
    }

    #[tokio::test]
    async fn test_exhausted_id_space_leaves_store_unchanged() {
        let store = InMemoryTaskStore::with_next_id(TaskId::new(u64::MAX));
        let err = store.add(new_task("last", "u")).await.unwrap_err();
        assert!(matches!(err, StorageError::IdSpaceExhausted));
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.next_id().await, TaskId::new(u64::MAX));
    }

    #[tokio::test]
    async fn test_concurrent_adds_keep_ids_unique() {
        let store = InMemoryTaskStore::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add(new_task(&format!("t{}", i), "u")).await.unwrap().id
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().get());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());

        let listed: Vec<u64> = store.list().await.unwrap().iter().map(|t| t.id.get()).collect();
        assert_eq!(listed, (1..=32).collect::<Vec<u64>>());
    }
}
