use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use family_tasks_core::Error as CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("unknown procedure: {0}")]
    UnknownProcedure(String),
    #[error("{0} is a mutation and must be called with POST")]
    MethodNotAllowed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Machine-readable failure category carried in every error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Store,
    UnknownProcedure,
    MethodNotAllowed,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Core(CoreError::Validation(_)) | ApiError::InvalidPayload(_) => {
                ErrorKind::Validation
            }
            ApiError::Core(CoreError::NotFound { .. }) => ErrorKind::NotFound,
            ApiError::Core(_) | ApiError::Internal(_) => ErrorKind::Store,
            ApiError::UnknownProcedure(_) => ErrorKind::UnknownProcedure,
            ApiError::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound | ErrorKind::UnknownProcedure => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let kind = self.kind();

        if status_code.is_server_error() {
            tracing::warn!(status = %status_code, error = %self, "RPC call failed");
        } else {
            tracing::debug!(status = %status_code, error = %self, "RPC call rejected");
        }

        let response = ApiResponse::<()>::error(kind, self.to_string());
        (status_code, Json(response)).into_response()
    }
}
