//! Errors surfaced by task creation.

use thiserror::Error;

use super::schema::ValidationErrors;
use super::store::StorageError;

#[derive(Debug, Error)]
pub enum TaskError {
    /// The caller supplied no payload at all.
    #[error("No task data supplied")]
    NullInput,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Rejected by the duplicate policy.
    #[error("A task titled '{title}' already exists")]
    Conflict {
        title: String,
        user_name: Option<String>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TaskError {
    /// Whether the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TaskError::Storage(_))
    }
}
