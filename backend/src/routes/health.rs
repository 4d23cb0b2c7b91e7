use std::sync::Arc;

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::pipeline::{HealthStatus, PipelineError, UploadPipeline};

#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    /// `ok` when both buckets are reachable, `error` otherwise
    status: String,
    /// Configured AWS region
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    /// Bucket holding normalized images
    #[serde(skip_serializing_if = "Option::is_none")]
    input_bucket: Option<String>,
    /// Bucket holding result records
    #[serde(skip_serializing_if = "Option::is_none")]
    output_bucket: Option<String>,
    /// Failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Current version of the application
    semver: String,
    /// Commit hash of the current build (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    rev: Option<String>,
}

/// Health probe outcome with its HTTP status
pub struct HealthReport {
    status: StatusCode,
    body: HealthResponse,
}

impl HealthReport {
    fn ok(health: HealthStatus) -> Self {
        Self {
            status: StatusCode::OK,
            body: HealthResponse {
                status: "ok".to_string(),
                region: Some(health.region),
                input_bucket: Some(health.input_bucket),
                output_bucket: Some(health.output_bucket),
                message: None,
                semver: env!("CARGO_PKG_VERSION").to_string(),
                rev: option_env!("GIT_REV").map(ToString::to_string),
            },
        }
    }

    fn error(err: &PipelineError) -> Self {
        // The store answered but refused: the service is up, its dependency is not
        let status = match err {
            PipelineError::Storage(bucket_err) if bucket_err.is_service_rejection() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            body: HealthResponse {
                status: "error".to_string(),
                region: None,
                input_bucket: None,
                output_bucket: None,
                message: Some(err.to_string()),
                semver: env!("CARGO_PKG_VERSION").to_string(),
                rev: option_env!("GIT_REV").map(ToString::to_string),
            },
        }
    }
}

impl IntoResponse for HealthReport {
    fn into_response(self) -> Response {
        if self.status != StatusCode::OK {
            tracing::error!(
                status = self.status.as_u16(),
                message = self.body.message.as_deref().unwrap_or_default(),
                "health check failed"
            );
        }

        (self.status, Json(self.body)).into_response()
    }
}

impl OperationOutput for HealthReport {
    type Inner = HealthResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<HealthResponse>::operation_response(ctx, operation)
    }
}

/// Health check endpoint
///
/// Verifies that the input and output buckets are reachable. Responds 200 when both
/// are, 503 when the store rejects a check and 500 when it cannot be contacted.
pub async fn handler(Extension(pipeline): Extension<Arc<UploadPipeline>>) -> HealthReport {
    match pipeline.check_health().await {
        Ok(health) => HealthReport::ok(health),
        Err(err) => HealthReport::error(&err),
    }
}
