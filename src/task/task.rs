//! Core Task record as held by the store.
//!
//! # Invariants
//! - `id` is assigned exactly once, by the store, and never reused
//! - a `Task` is immutable after creation (no setters, no update path)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the task store.
///
/// # Properties
/// - Positive (the first id handed out is 1)
/// - Strictly increasing in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// The id a fresh store hands out first.
    pub const FIRST: TaskId = TaskId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` once the id space is exhausted.
    pub fn next(&self) -> Option<TaskId> {
        self.0.checked_add(1).map(TaskId)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority, either a numeric level or a categorical label.
///
/// Which form is accepted depends on the configured priority rule; both
/// serialize as bare JSON values (`3` or `"high"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Priority {
    Level(i64),
    Label(String),
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Level(level) => write!(f, "{}", level),
            Priority::Label(label) => write!(f, "{}", label),
        }
    }
}

/// A task that passed schema validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: NaiveDate,
    pub user_name: String,
    pub location: Option<String>,
}

impl NewTask {
    /// Attach the store-assigned id.
    pub fn with_id(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            user_name: self.user_name,
            location: self.location,
        }
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Serialized as `YYYY-MM-DD`
    pub due_date: NaiveDate,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
