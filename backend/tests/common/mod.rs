#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, response::Response, Router};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use labeler::{
    label_detection::{mock::MockLabelDetector, Label},
    media_storage::mock::InMemoryContentStore,
    pipeline::{PipelineConfig, UploadPipeline},
    server,
    types::Environment,
};
use tower::ServiceExt;

pub const INPUT_BUCKET: &str = "test-inputs";
pub const OUTPUT_BUCKET: &str = "test-outputs";
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

const BOUNDARY: &str = "labeler-test-boundary";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        input_bucket: INPUT_BUCKET.to_string(),
        output_bucket: OUTPUT_BUCKET.to_string(),
        region: "us-east-1".to_string(),
        max_labels: 10,
        min_confidence: 50.0,
        allowed_extensions: ["jpg", "jpeg", "png", "bmp", "tiff", "webp"]
            .into_iter()
            .map(String::from)
            .collect(),
        max_image_bytes: MAX_IMAGE_BYTES,
        link_expiry: Duration::from_secs(3600),
    }
}

/// Router over in-memory collaborators
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<InMemoryContentStore>,
    pub detector: Arc<MockLabelDetector>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_detector(MockLabelDetector::returning(vec![Label::new("Red", 91.2)]))
    }

    pub fn with_detector(detector: MockLabelDetector) -> Self {
        Self::build(detector, Environment::Development {
            presign_expiry_override: None,
        })
    }

    pub fn in_production() -> Self {
        Self::build(
            MockLabelDetector::returning(Vec::new()),
            Environment::Production,
        )
    }

    fn build(detector: MockLabelDetector, environment: Environment) -> Self {
        setup_test_env();

        let store = Arc::new(InMemoryContentStore::new());
        let detector = Arc::new(detector);
        let pipeline = Arc::new(UploadPipeline::new(
            store.clone(),
            detector.clone(),
            test_config(),
        ));

        Self {
            router: server::app(environment, pipeline),
            store,
            detector,
        }
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;

        Ok(self.router.clone().oneshot(request).await?)
    }

    /// Posts a multipart body with one field per part
    pub async fn send_upload(
        &self,
        parts: &[Part<'_>],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let body = multipart_body(parts);
        let request = Request::builder()
            .uri("/upload")
            .method("POST")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("Content-Length", body.len())
            .body(Body::from(body))?;

        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn send_raw_post(
        &self,
        route: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", content_type)
            .body(Body::from(body))?;

        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let body = response.into_body().collect().await?.to_bytes();
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn response_text(
        &self,
        response: Response,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let body = response.into_body().collect().await?.to_bytes();
        Ok(String::from_utf8(body.to_vec())?)
    }
}

/// One multipart part
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> Part<'a> {
    pub const fn file(name: &'a str, filename: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            bytes,
        }
    }

    pub const fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            bytes: value.as_bytes(),
        }
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// 100x100 solid red PNG
pub fn red_png() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([255, 0, 0])))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("failed to encode test PNG");
    buf
}
