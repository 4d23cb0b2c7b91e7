use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::pipeline::UploadPipeline;

#[derive(Debug, Serialize, JsonSchema)]
pub struct ConfigResponse {
    /// Lower-cased file extensions accepted by `POST /upload`
    allowed_extensions: Vec<String>,
    /// Upload ceiling in bytes, before and after normalization
    max_image_bytes: usize,
    /// Maximum number of labels returned per image
    max_labels: i32,
    /// Minimum confidence (0-100) of returned labels
    min_confidence: f32,
    /// Lifetime of result links in seconds
    result_link_expiry_secs: u64,
}

/// Upload constraints
///
/// Returns the limits the upload form enforces, so clients can check files before
/// sending them.
#[allow(clippy::unused_async)]
pub async fn handler(Extension(pipeline): Extension<Arc<UploadPipeline>>) -> Json<ConfigResponse> {
    let config = pipeline.config();

    Json(ConfigResponse {
        allowed_extensions: config.allowed_extensions.iter().cloned().collect(),
        max_image_bytes: config.max_image_bytes,
        max_labels: config.max_labels,
        min_confidence: config.min_confidence,
        result_link_expiry_secs: config.link_expiry.as_secs(),
    })
}
