//! Request-level error taxonomy and its mapping onto HTTP responses.

use axum::http::header::{InvalidHeaderValue, CONTENT_RANGE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::range::RangeError;
use crate::storage::StorageError;

/// Terminal failure for one request. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("object not found: {key}")]
    NotFound { key: String },
    #[error("object has no readable body: {key}")]
    EmptyBody { key: String },
    #[error(transparent)]
    InvalidRange(#[from] RangeError),
    #[error("server error: {0}")]
    Internal(#[from] StorageError),
    #[error("server error: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServeError::InvalidRange(_) => StatusCode::RANGE_NOT_SATISFIABLE,
            ServeError::EmptyBody { .. }
            | ServeError::Internal(_)
            | ServeError::InvalidHeader(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        match self {
            ServeError::InvalidRange(e) => {
                (status, [(CONTENT_RANGE, e.content_range())], message).into_response()
            }
            _ => (status, message).into_response(),
        }
    }
}
