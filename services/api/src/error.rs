//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use thiserror::Error;
use tracing::{error, warn};

use crate::response::Envelope;
use crate::storage::StorageError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed body, out-of-range value, or duplicate business record
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Ownership or role violation
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Object storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(e) => match e {
                DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
                DatabaseError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                DatabaseError::UniqueViolation { .. } | DatabaseError::ForeignKeyViolation { .. } => {
                    StatusCode::CONFLICT
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to show to clients; internal causes are only logged
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Database(DatabaseError::NotFound { .. }) => "Resource not found".to_string(),
            ApiError::Database(DatabaseError::UniqueViolation { .. }) => {
                "Resource already exists".to_string()
            }
            ApiError::Database(DatabaseError::ForeignKeyViolation { .. }) => {
                "Resource is still referenced".to_string()
            }
            ApiError::Database(DatabaseError::InvalidInput(msg)) => msg.clone(),
            ApiError::Database(_) => "Database error".to_string(),
            ApiError::Storage(_) => "Storage error".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Log the error with handler context and hand it back
    pub fn logged(self, context: &str) -> Self {
        if self.status_code().is_server_error() {
            error!(target: "telemetry", "{}: {}", context, self);
        } else {
            warn!("{}: {}", context, self);
        }
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Envelope::<()> {
            code: status.as_u16(),
            message: self.public_message(),
            data: None,
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_map_to_statuses() {
        let not_found = ApiError::from(DatabaseError::NotFound { table: "symptoms" });
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.public_message(), "Resource not found");

        let duplicate = ApiError::from(DatabaseError::UniqueViolation {
            constraint: "users_email_key".to_string(),
        });
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

        let referenced = ApiError::from(DatabaseError::ForeignKeyViolation {
            constraint: "monitorings_symptom_id_fkey".to_string(),
        });
        assert_eq!(referenced.status_code(), StatusCode::CONFLICT);
        assert_eq!(referenced.public_message(), "Resource is still referenced");

        let broken = ApiError::from(DatabaseError::Migration("boom".to_string()));
        assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(broken.public_message(), "Database error");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = ApiError::forbidden("Not the owner of this record");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), "Not the owner of this record");
    }
}
