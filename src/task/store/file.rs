//! JSON file-based task store.
//!
//! The whole store is one document, `{"tasks": [...], "id_counter": N}`,
//! rewritten through a temp file and rename on every add. The in-memory
//! state only changes after the rename succeeded, so a failed write never
//! leaves a record or a counter advance behind.

use super::{StorageError, TaskStore, TaskStoreSnapshot};
use crate::task::task::{NewTask, Task, TaskId};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct FileTaskStore {
    path: PathBuf,
    state: Arc<RwLock<TaskStoreSnapshot>>,
}

impl FileTaskStore {
    /// Open the store at `path`, loading existing contents.
    ///
    /// A missing file starts an empty store. A file that exists but cannot be
    /// read or parsed is an error rather than being silently replaced.
    pub async fn open(path: PathBuf) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let snapshot = match fs::read(&path).await {
            Ok(bytes) => {
                let snapshot = serde_json::from_slice::<TaskStoreSnapshot>(&bytes).map_err(
                    |source| StorageError::Parse {
                        path: path.clone(),
                        source,
                    },
                )?;
                tracing::info!(
                    "Loaded {} tasks from {}",
                    snapshot.tasks.len(),
                    path.display()
                );
                repair_counter(snapshot, &path)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No task store at {}, starting empty", path.display());
                TaskStoreSnapshot::default()
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(snapshot)),
        })
    }

    async fn persist(&self, snapshot: &TaskStoreSnapshot) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(snapshot).map_err(StorageError::Serialize)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)
            .await
            .map_err(|source| StorageError::Write {
                path: tmp_path.clone(),
                source,
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}

/// Keep the counter above every stored id so ids are never reused.
fn repair_counter(mut snapshot: TaskStoreSnapshot, path: &Path) -> TaskStoreSnapshot {
    let min_counter = snapshot.min_counter();
    if snapshot.id_counter < min_counter {
        tracing::warn!(
            "Task store {} has id_counter {} below stored ids, resetting to {}",
            path.display(),
            snapshot.id_counter,
            min_counter
        );
        snapshot.id_counter = min_counter;
    }
    snapshot
}

#[async_trait]
impl TaskStore for FileTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn add(&self, new_task: NewTask) -> Result<Task, StorageError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let task = next.push(new_task)?;
        self.persist(&next).await?;
        *state = next;
        tracing::debug!(
            "Task created: id={} title={:?} ({})",
            task.id,
            task.title,
            self.path.display()
        );
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
