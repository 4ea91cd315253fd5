//! Custom error types for the film service

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::{filter::UnknownFilter, session::SessionError, validation::FieldError};

/// Custom error type for the film service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid session, or rejected credentials
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// One or more request fields are malformed
    #[error("Validation failed on {} field(s)", .0.len())]
    ValidationFailed(Vec<FieldError>),

    /// Film missing or owned by someone else
    #[error("{0} not found")]
    NotFound(String),

    /// The underlying store failed
    #[error("Store failure: {0}")]
    StoreFailure(#[source] DatabaseError),

    /// Filter name outside the known set.
    ///
    /// Reported as a server error, as the existing client contract expects.
    #[error(transparent)]
    InvalidFilter(#[from] UnknownFilter),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    /// Map a store error raised while mutating a film.
    ///
    /// A missing target is not surfaced as 404 on writes; it is folded into
    /// the generic store failure.
    pub fn from_write(err: DatabaseError) -> Self {
        ApiError::StoreFailure(err)
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::ValidationFailed(_) => "validation_failed",
            ApiError::NotFound(_) => "not_found",
            ApiError::StoreFailure(_) => "store_failure",
            ApiError::InvalidFilter(_) => "invalid_filter",
            ApiError::InternalServerError => "internal",
        }
    }
}

/// Reads surface a missing film as 404; anything else is a store failure
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::StoreFailure(other),
        }
    }
}

/// A body axum could not read as the expected JSON object
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationFailed(vec![FieldError {
            field: "body",
            message: rejection.body_text(),
        }])
    }
}

/// A film id that is not an integer names no film
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!("Rejected path: {}", rejection.body_text());
        ApiError::NotFound("Film".to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Unauthenticated => {
                ApiError::Unauthenticated("Not authenticated".to_string())
            }
            SessionError::Store(e) => {
                error!("Session store failure: {}", e);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match &self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::ValidationFailed(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed".to_string(),
            ),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::StoreFailure(DatabaseError::NotFound(what)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("{} not found", what),
            ),
            ApiError::StoreFailure(e) => {
                error!("Store failure: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Database error".to_string())
            }
            ApiError::InvalidFilter(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = match self {
            ApiError::ValidationFailed(errors) => Json(json!({
                "error": error_message,
                "kind": kind,
                "errors": errors,
            })),
            _ => Json(json!({
                "error": error_message,
                "kind": kind,
            })),
        };

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
