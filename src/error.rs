use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the attendance engine and its stores.
///
/// Nothing inside the engine recovers from these; the caller decides whether
/// to retry.
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// Business rule refusal, shown to the user verbatim.
    #[error("{0}")]
    PolicyBlocked(String),

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Unknown id, or a record that is no longer in the expected state.
    #[error("{0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;

impl AttendanceError {
    pub fn blocked(message: impl Into<String>) -> Self {
        AttendanceError::PolicyBlocked(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AttendanceError::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AttendanceError::InvalidInput(message.into())
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::PolicyBlocked(_) => StatusCode::CONFLICT,
            AttendanceError::LocationUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AttendanceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Persistence(e) => {
                tracing::error!(error = %e, "Persistence failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_refusals_map_to_conflict() {
        let err = AttendanceError::blocked("already clocked in");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "already clocked in");
    }

    #[test]
    fn persistence_failures_hide_details() {
        let err = AttendanceError::Persistence(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn location_and_lookup_errors_have_distinct_statuses() {
        assert_eq!(
            AttendanceError::LocationUnavailable("timed out".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AttendanceError::not_found("no such request").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AttendanceError::invalid("radius must be positive").status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
