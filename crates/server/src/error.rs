//! HTTP error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use warden_application::ApplicationError;
use warden_domain::{AuthError, ErrorCode};

/// Failure returned by a handler or the gate.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ApplicationError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(ApplicationError::Auth(err))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps `data`.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

impl ApiError {
    /// Public code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.0.code()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_expected() {
            tracing::debug!(error = %self.0, "Request rejected");
        } else {
            tracing::error!(error = %self.0, "Request failed");
        }
        let code = self.code();
        let status = StatusCode::from_u16(code.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: code.code,
                message: code.message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use warden_application::ports::StoreError;

    #[test]
    fn test_internal_failures_hide_details() {
        let err = ApiError(StoreError::Unavailable("redis://10.0.0.3 refused".into()).into());
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rate_limit_status() {
        let err = ApiError::from(AuthError::RateLimitExceeded("k".into()));
        assert_eq!(err.code(), ErrorCode::TOO_MANY_REQUESTS);
        assert_eq!(err.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
