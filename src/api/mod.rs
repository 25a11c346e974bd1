//! HTTP API for task management.
//!
//! ## Endpoints
//!
//! - `POST /tasks` - Create a task
//! - `GET /tasks` - List all tasks
//! - `GET /health` - Health check

mod routes;
pub mod tasks;
pub mod types;

pub use routes::{build_router, serve, AppState};
pub use types::*;
