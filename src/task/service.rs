//! Task creation service.
//!
//! ## Creation Flow
//! 1. Reject an absent payload
//! 2. Report the request (acting user) to the event sink
//! 3. Validate against the schema; the store is not touched on failure
//! 4. Apply the duplicate policy
//! 5. Persist through the store and report the assigned id
//!
//! Steps 4 and 5 run under one lock so the duplicate check and the insert
//! cannot interleave with another creation.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::draft::TaskDraft;
use super::error::TaskError;
use super::events::{TaskEvent, TaskEventSink};
use super::schema::TaskSchema;
use super::store::TaskStore;
use super::task::Task;

/// What counts as a duplicate task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Duplicates are stored under fresh ids.
    #[default]
    Allow,
    /// Reject a title that any stored task already uses.
    RejectTitle,
    /// Reject a title the same user already uses.
    RejectTitlePerUser,
}

impl DuplicatePolicy {
    /// Parse from environment variable value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "allow" | "none" => Some(Self::Allow),
            "title" | "reject_title" => Some(Self::RejectTitle),
            "title_per_user" | "reject_title_per_user" => Some(Self::RejectTitlePerUser),
            _ => None,
        }
    }
}

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    schema: TaskSchema,
    duplicates: DuplicatePolicy,
    events: Arc<dyn TaskEventSink>,
    create_lock: Mutex<()>,
}

impl TaskService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        schema: TaskSchema,
        duplicates: DuplicatePolicy,
        events: Arc<dyn TaskEventSink>,
    ) -> Self {
        Self {
            store,
            schema,
            duplicates,
            events,
            create_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Validate and store a new task.
    ///
    /// # Errors
    /// - `TaskError::NullInput` when `draft` is `None`
    /// - `TaskError::Validation` when the schema rejects the draft
    /// - `TaskError::Conflict` when the duplicate policy rejects it
    /// - `TaskError::Storage` when the store fails
    ///
    /// Only the storage case can have touched the store, and the store
    /// guarantees a failed add leaves no record behind.
    pub async fn create(&self, draft: Option<TaskDraft>) -> Result<Task, TaskError> {
        let draft = draft.ok_or(TaskError::NullInput)?;
        let user_hint = draft.user_name_hint().map(str::to_string);

        self.events.emit(&TaskEvent::CreateRequested {
            user_name: user_hint.clone(),
        });

        let new_task = match self.schema.validate(&draft) {
            Ok(new_task) => new_task,
            Err(errors) => {
                self.events.emit(&TaskEvent::Rejected {
                    user_name: user_hint,
                    reason: errors.to_string(),
                });
                return Err(TaskError::Validation(errors));
            }
        };

        let _guard = self.create_lock.lock().await;

        if let Some(scope) = self.duplicate_scope(&new_task.user_name) {
            if let Some(existing) = self.store.find_by_title(&new_task.title, scope).await? {
                let err = TaskError::Conflict {
                    title: existing.title,
                    user_name: scope.map(str::to_string),
                };
                self.events.emit(&TaskEvent::Rejected {
                    user_name: Some(new_task.user_name.clone()),
                    reason: err.to_string(),
                });
                return Err(err);
            }
        }

        let task = self.store.add(new_task).await.map_err(|e| {
            tracing::error!("Failed to store task: {}", e);
            TaskError::Storage(e)
        })?;

        self.events.emit(&TaskEvent::Created {
            id: task.id,
            title: task.title.clone(),
            user_name: task.user_name.clone(),
        });
        Ok(task)
    }

    /// All stored tasks in id order.
    pub async fn list(&self) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.list().await?)
    }

    /// `None` when duplicates are allowed, otherwise the user filter to
    /// apply to the title lookup.
    fn duplicate_scope<'a>(&self, user_name: &'a str) -> Option<Option<&'a str>> {
        match self.duplicates {
            DuplicatePolicy::Allow => None,
            DuplicatePolicy::RejectTitle => Some(None),
            DuplicatePolicy::RejectTitlePerUser => Some(Some(user_name)),
        }
    }
}
