//! JSON error responses for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Whether the same request may succeed if retried.
    #[serde(default)]
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        let details = (!err.details.is_empty()).then(|| {
            serde_json::Value::Object(
                err.details
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            )
        });
        Self {
            error_code: err.code.to_string(),
            message: err.message.clone(),
            details,
            retryable: err.is_retryable(),
        }
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::ProfileNotFound | ErrorCode::PostNotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotConfigured | ErrorCode::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Converts domain errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.code);
        if status.is_server_error() {
            tracing::error!(code = %self.0.code, "{}", self.0.message);
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_failure_is_forbidden_with_redirect_detail() {
        let err = DomainError::new(ErrorCode::Forbidden, "Survey required")
            .with_detail("redirect", "/survey");

        let body = ErrorResponse::from(&err);

        assert_eq!(status_for(err.code), StatusCode::FORBIDDEN);
        assert_eq!(body.error_code, "FORBIDDEN");
        assert_eq!(
            body.details,
            Some(serde_json::json!({"redirect": "/survey"}))
        );
    }

    #[test]
    fn transient_errors_are_marked_retryable() {
        let err = DomainError::new(ErrorCode::BackendUnavailable, "down");
        let body = ErrorResponse::from(&err);

        assert!(body.retryable);
        assert!(body.details.is_none());
        assert_eq!(status_for(err.code), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn api_error_renders_status() {
        let response = ApiError(DomainError::validation("email", "missing @ symbol")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
