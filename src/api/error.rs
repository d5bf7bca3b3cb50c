use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::ApiResponse;
use crate::services::ServiceError;

/// Errors surfaced by handlers. Storage and internal failures are logged and
/// replaced by a generic message so SQL and member data stay out of responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::ValidationError(msg)
            | Self::Conflict(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg) => msg.clone(),
            Self::Timeout => "The operation timed out and was rolled back".to_string(),
            Self::DatabaseError(_) => "A database error occurred".to_string(),
            Self::InternalError(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::DatabaseError(_) | Self::InternalError(_) => tracing::error!(error = %self),
            Self::Timeout => tracing::warn!("Request exceeded its deadline"),
            _ => {}
        }

        let body = ApiResponse::<()>::error(self.public_message());
        (self.status(), Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidArgument(msg) => Self::ValidationError(msg),
            ServiceError::NotFound(msg) => Self::NotFound(msg),
            ServiceError::Conflict(msg) => Self::Conflict(msg),
            ServiceError::Io(msg) => Self::DatabaseError(msg),
            ServiceError::Timeout => Self::Timeout,
            ServiceError::Unauthorized(msg) => Self::Unauthorized(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ServiceError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_service_errors_map_to_status_codes() {
        assert_eq!(status_of(ServiceError::invalid("bad")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ServiceError::not_found("member", 1)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ServiceError::conflict("dup")), StatusCode::CONFLICT);
        assert_eq!(
            status_of(ServiceError::Io("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(ServiceError::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            status_of(ServiceError::Unauthorized("no".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_storage_details_stay_private() {
        let err = ApiError::DatabaseError("UNIQUE constraint failed: members.civil_id".into());
        assert_eq!(err.public_message(), "A database error occurred");
        assert_eq!(ApiError::forbidden("Staff only").public_message(), "Staff only");
    }
}
