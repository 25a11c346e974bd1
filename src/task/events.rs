//! Creation events emitted by the task service.
//!
//! The service reports through an injected `TaskEventSink` instead of
//! logging directly, so the sequence of events is observable in tests.

use std::sync::Mutex;

use super::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// A creation request arrived, before validation.
    CreateRequested { user_name: Option<String> },
    /// The task was persisted.
    Created {
        id: TaskId,
        title: String,
        user_name: String,
    },
    /// The request was turned down (validation or duplicate policy).
    Rejected {
        user_name: Option<String>,
        reason: String,
    },
}

pub trait TaskEventSink: Send + Sync {
    fn emit(&self, event: &TaskEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl TaskEventSink for TracingEventSink {
    fn emit(&self, event: &TaskEvent) {
        match event {
            TaskEvent::CreateRequested { user_name } => {
                tracing::info!(
                    user_name = user_name.as_deref().unwrap_or("<unknown>"),
                    "Creating task for user: {}",
                    user_name.as_deref().unwrap_or("<unknown>")
                );
            }
            TaskEvent::Created {
                id,
                title,
                user_name,
            } => {
                tracing::info!(
                    task_id = id.get(),
                    user_name = %user_name,
                    "Task created: id={} title={:?}",
                    id,
                    title
                );
            }
            TaskEvent::Rejected { user_name, reason } => {
                tracing::info!(
                    user_name = user_name.as_deref().unwrap_or("<unknown>"),
                    "Task rejected: {}",
                    reason
                );
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<TaskEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TaskEventSink for MemoryEventSink {
    fn emit(&self, event: &TaskEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
