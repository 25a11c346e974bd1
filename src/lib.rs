//! # Task API
//!
//! A small task-management REST service.
//!
//! This library provides:
//! - A task schema with configurable field rules
//! - Task stores (in-memory and JSON file) with sequential ids
//! - A creation service tying validation, duplicate policy and storage together
//! - An axum HTTP API exposing create and list
//!
//! ## Task Flow
//! 1. `POST /tasks` body is decoded into a `TaskDraft`
//! 2. `TaskService` validates it against the `TaskSchema`
//! 3. The duplicate policy is applied
//! 4. The store assigns the next id and persists the task
//! 5. The stored task is returned with `201 Created`
//!
//! ## Modules
//! - `task`: Task records, schema, stores and the creation service
//! - `api`: HTTP routes and error mapping
//! - `config`: Environment-driven configuration

pub mod api;
pub mod config;
pub mod task;
pub mod util;

pub use config::Config;
pub use task::{Task, TaskDraft, TaskError, TaskService};
