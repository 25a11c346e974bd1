//! Task module - the task record, its schema, storage and creation service.
//!
//! Layering, leaf first:
//! - `task`: the record types
//! - `draft` / `schema`: unvalidated input and the rules it must satisfy
//! - `store`: id assignment and persistence
//! - `service`: validation, duplicate policy and storage in one call

pub mod draft;
pub mod error;
pub mod events;
pub mod schema;
pub mod service;
pub mod store;
pub mod task;

pub use draft::{Field, PriorityInput, TaskDraft};
pub use error::TaskError;
pub use events::{MemoryEventSink, TaskEvent, TaskEventSink, TracingEventSink};
pub use schema::{PriorityRule, TaskSchema, ValidationError, ValidationErrorKind, ValidationErrors};
pub use service::{DuplicatePolicy, TaskService};
pub use store::{create_task_store, StorageError, TaskStore, TaskStoreType};
pub use task::{NewTask, Priority, Task, TaskId};
