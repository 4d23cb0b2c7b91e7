use std::sync::Arc;
use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{extract::DefaultBodyLimit, Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;

use crate::routes;
use crate::{pipeline::UploadPipeline, types::Environment};

/// Room left in the request body for multipart boundaries and headers
const MULTIPART_ENVELOPE_BYTES: usize = 64 * 1024;

/// Builds the application router with its extensions attached
///
/// The body limit covers the declared-length allowance of twice the image ceiling.
pub fn app(environment: Environment, pipeline: Arc<UploadPipeline>) -> Router {
    let mut openapi = OpenApi::default();
    let body_limit = pipeline
        .config()
        .max_image_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_ENVELOPE_BYTES);

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(pipeline))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(environment: Environment, pipeline: Arc<UploadPipeline>) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()));

    let router = app(environment, pipeline)
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(tower_http::timeout::TimeoutLayer::new(Duration::from_secs(
            30,
        )));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Image Labeler started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
