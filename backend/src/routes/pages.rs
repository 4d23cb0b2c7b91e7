use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path,
    },
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::Html,
    Extension,
};

use crate::{
    pipeline::{PipelineConfig, UploadPipeline, UploadRequest, UploadedFile, ValidationError},
    templates::{IndexPage, ResultsPage},
    types::AppError,
};

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "image";

fn render(page: &impl Template) -> Result<Html<String>, AppError> {
    page.render().map(Html).map_err(|e| AppError::render(&e))
}

/// Upload form
#[allow(clippy::unused_async)]
pub async fn index(
    Extension(pipeline): Extension<Arc<UploadPipeline>>,
) -> Result<Html<String>, AppError> {
    render(&IndexPage::form(pipeline.config()))
}

/// Runs an upload through the pipeline and renders the form with its outcome
///
/// Validation, decode, storage and label failures are shown on the page with a 200.
#[tracing::instrument(skip_all)]
pub async fn upload(
    Extension(pipeline): Extension<Arc<UploadPipeline>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, AppError> {
    let config = pipeline.config();
    let page = IndexPage::form(config);

    let file = match multipart {
        Ok(multipart) => read_image_field(multipart, config).await,
        Err(rejection) => {
            tracing::debug!("upload is not multipart: {rejection}");
            Ok(None)
        }
    };

    let page = match file {
        Ok(file) => {
            let request = UploadRequest {
                file,
                declared_length: declared_length(&headers),
            };
            match pipeline.process_upload(request).await {
                Ok(outcome) => page.with_outcome(outcome),
                Err(err) => page.with_error(err.to_string()),
            }
        }
        Err(err) => page.with_error(err.to_string()),
    };

    render(&page)
}

/// Link page for a stored result record
#[tracing::instrument(skip_all, fields(name = %name))]
pub async fn show_results(
    Extension(pipeline): Extension<Arc<UploadPipeline>>,
    Path(name): Path<String>,
) -> Result<Html<String>, AppError> {
    let found = pipeline
        .lookup_result(&name)
        .await
        .map_err(|err| AppError::from_lookup(&name, err))?;

    render(&ResultsPage::from(found))
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// Reads the first `image` file part, skipping any others
///
/// Parts without a filename are form values, not files. A file part with an empty
/// filename is passed on so the pipeline can reject it.
async fn read_image_field(
    mut multipart: Multipart,
    config: &PipelineConfig,
) -> Result<Option<UploadedFile>, ValidationError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(err) => return Err(multipart_failure(&err, config)),
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|err| multipart_failure(&err, config))?;

        return Ok(Some(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        }));
    }
}

fn multipart_failure(err: &MultipartError, config: &PipelineConfig) -> ValidationError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::TooLarge {
            max_mb: config.max_image_mb(),
        }
    } else {
        tracing::warn!("malformed multipart body: {}", err.body_text());
        ValidationError::MissingFile
    }
}
