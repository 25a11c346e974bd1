//! API request and response types.

use serde::Serialize;

use crate::task::ValidationError;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Active store backend (`memory` or `file`)
    pub store: String,
    /// Whether tasks survive a restart
    pub persistent: bool,
}

/// Error body returned for every non-2xx response.
///
/// `error` is a one-line summary; `detail` is either a message or the list
/// of rejected fields.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<ValidationError>),
}
