//! Error responses for routes that do not render a page

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::pipeline::PipelineError;

/// API error response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: &'static str,
        msg: impl Into<String>,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code,
                    message: msg.into(),
                },
            },
        }
    }

    /// Failure to render an HTML page
    #[must_use]
    pub fn render(err: &askama::Error) -> Self {
        tracing::error!("Template rendering failed: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
            true,
        )
    }

    /// HTTP status of the response
    #[cfg(test)]
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable message of the response
    #[cfg(test)]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.error.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl AppError {
    /// Convert a result lookup failure for `name` (as requested by the client)
    #[must_use]
    pub fn from_lookup(name: &str, err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound(_) => Self::new(
                StatusCode::NOT_FOUND,
                "not_found",
                err.to_string(),
                false,
            ),
            PipelineError::Storage(ref bucket_err) if bucket_err.is_service_rejection() => {
                Self::new(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("Error locating results for '{name}': {bucket_err}"),
                    false,
                )
            }
            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                format!("Error generating results page for '{name}': {other}"),
                true,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_storage::BucketError;

    #[test]
    fn test_lookup_error_mapping() {
        let not_found = AppError::from_lookup("foo", PipelineError::NotFound("foo".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert!(not_found.message().contains("'foo'"));

        let denied = AppError::from_lookup(
            "foo",
            PipelineError::Storage(BucketError::S3Error("Forbidden".into())),
        );
        assert_eq!(denied.status(), StatusCode::NOT_FOUND);
        assert_eq!(denied.message(), "Error locating results for 'foo': Forbidden");

        let offline = AppError::from_lookup(
            "foo",
            PipelineError::Storage(BucketError::AwsError("dispatch failure".into())),
        );
        assert_eq!(offline.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            offline.message(),
            "Error generating results page for 'foo': AWS client error: dispatch failure"
        );
    }
}
