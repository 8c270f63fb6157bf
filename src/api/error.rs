use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, ListError, ReviewError};

#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    /// A business-rule gate failed; same status as validation, different
    /// provenance.
    PreconditionError(String),

    NotFound(String),

    Conflict(String),

    Unauthorized(String),

    Forbidden(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::PreconditionError(msg) => write!(f, "Precondition failed: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::ValidationError(msg) | Self::PreconditionError(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::InvalidToken => Self::Forbidden(err.to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Validation(msg) => Self::ValidationError(msg),
            ReviewError::NotInList | ReviewError::PlanToWatch | ReviewError::NotYetAired => {
                Self::PreconditionError(err.to_string())
            }
            ReviewError::AlreadyReviewed => Self::Conflict(err.to_string()),
            ReviewError::ReviewNotFound | ReviewError::NotFoundOrUnauthorized => {
                Self::NotFound(err.to_string())
            }
            ReviewError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<ListError> for ApiError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::InvalidListType => Self::ValidationError(err.to_string()),
            ListError::NotYetAired => Self::PreconditionError(err.to_string()),
            ListError::AlreadyInList => Self::Conflict(err.to_string()),
            ListError::FilmNotFound | ListError::NotInList => Self::NotFound(err.to_string()),
            ListError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn film_not_found(id: i32) -> Self {
        Self::NotFound(format!("Film {} not found", id))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
