//! Task endpoints and the mapping from task errors to HTTP responses.
//!
//! | Outcome | Status |
//! |---|---|
//! | created | 201 |
//! | validation failure | 422 (or 400, per config) |
//! | duplicate | 409 |
//! | `null` body, malformed or non-object JSON | 400 |
//! | missing JSON content type | 415 |
//! | storage failure | 500 |

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::routes::AppState;
use super::types::{ErrorDetail, ErrorResponse};
use crate::config::ValidationStatus;
use crate::task::draft::DraftDecodeError;
use crate::task::{Task, TaskDraft, TaskError};

/// An error response: status plus JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: ErrorDetail) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                detail,
            },
        }
    }

    fn message(status: StatusCode, error: &str, detail: impl Into<String>) -> Self {
        Self::new(status, error, ErrorDetail::Message(detail.into()))
    }

    pub fn invalid_payload() -> Self {
        Self::message(StatusCode::BAD_REQUEST, "Invalid payload", "Invalid payload")
    }

    pub fn not_found(path: &str) -> Self {
        Self::message(
            StatusCode::NOT_FOUND,
            "Not Found",
            format!("No route for {}", path),
        )
    }

    /// Map a service failure, using `validation_status` for schema errors.
    pub fn from_task_error(err: TaskError, validation_status: ValidationStatus) -> Self {
        match err {
            TaskError::NullInput => Self::message(
                StatusCode::BAD_REQUEST,
                "Invalid payload",
                "Request body is required",
            ),
            TaskError::Validation(errors) => {
                let status = match validation_status {
                    ValidationStatus::BadRequest => StatusCode::BAD_REQUEST,
                    ValidationStatus::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
                };
                Self::new(
                    status,
                    format!("Validation failed: {}", errors.fields().join(", ")),
                    ErrorDetail::Fields(errors.errors().to_vec()),
                )
            }
            TaskError::Conflict { .. } => {
                Self::message(StatusCode::CONFLICT, "Duplicate task", err.to_string())
            }
            TaskError::Storage(e) => {
                tracing::error!("Task storage failure: {:?}", e);
                Self::message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "The task could not be saved",
                )
            }
        }
    }

    fn from_rejection(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected task payload: {}", rejection.body_text());
        match rejection {
            JsonRejection::MissingJsonContentType(_) => Self::message(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Invalid payload",
                "Invalid payload: expected application/json",
            ),
            _ => Self::invalid_payload(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// POST /tasks - Create a task.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(value) = payload.map_err(ApiError::from_rejection)?;
    let draft = TaskDraft::from_json(value).map_err(|err| match err {
        DraftDecodeError::NotAnObject => ApiError::invalid_payload(),
    })?;

    let validation_status = state.config.validation_status;
    let task = state
        .service
        .create(draft)
        .await
        .map_err(|e| ApiError::from_task_error(e, validation_status))?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks - List all tasks in creation order.
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    let validation_status = state.config.validation_status;
    state
        .service
        .list()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_task_error(e, validation_status))
}
