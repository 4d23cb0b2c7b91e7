//! Upload pipeline: validate, normalize, store, classify, store results, link
//!
//! Every step that succeeds is permanent. A failure after the image has been stored
//! leaves the image in place; nothing is rolled back or retried.

mod config;
mod error;
pub mod keys;
pub mod normalize;
pub mod record;
pub mod validation;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult, ValidationError};

use crate::{
    label_detection::{Label, LabelDetector},
    media_storage::{ContentStore, PresignedUrl},
};
use keys::StorageKeys;
use normalize::NORMALIZED_CONTENT_TYPE;
use record::{ResultRecord, RECORD_CONTENT_TYPE};

/// A file received in the `image` form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Filename as sent by the client (may be empty)
    pub filename: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

/// One upload as received by the HTTP layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    /// The `image` field, if the request carried one
    pub file: Option<UploadedFile>,
    /// Request `Content-Length`, if declared
    pub declared_length: Option<u64>,
}

/// Successful upload: labels plus where everything went
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Detected labels, in service order
    pub labels: Vec<Label>,
    /// Key of the stored normalized image
    pub image_key: String,
    /// Key of the stored result record
    pub result_key: String,
    /// Time-limited link to the result record
    pub link: PresignedUrl,
}

/// Retrieval link for an existing result record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLink {
    /// Fully qualified result key
    pub result_key: String,
    /// Time-limited link to the record
    pub link: PresignedUrl,
}

/// Both buckets answered the reachability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    /// Configured AWS region
    pub region: String,
    /// Bucket holding normalized images
    pub input_bucket: String,
    /// Bucket holding result records
    pub output_bucket: String,
}

/// Sequences one upload through the content store and the label service
pub struct UploadPipeline {
    store: Arc<dyn ContentStore>,
    detector: Arc<dyn LabelDetector>,
    config: PipelineConfig,
}

impl UploadPipeline {
    /// Creates a pipeline over shared, stateless service clients
    #[must_use]
    pub fn new(
        store: Arc<dyn ContentStore>,
        detector: Arc<dyn LabelDetector>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            detector,
            config,
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one upload end to end
    ///
    /// # Errors
    ///
    /// - `PipelineError::Validation` before any external call
    /// - `PipelineError::Decode` if the bytes are not an image, before any store write
    /// - `PipelineError::Storage` if a write or the link request fails
    /// - `PipelineError::Classification` if the label service rejects the image
    #[instrument(skip_all, fields(filename = tracing::field::Empty))]
    pub async fn process_upload(&self, request: UploadRequest) -> PipelineResult<UploadOutcome> {
        let file = validation::validate(request, &self.config)?;
        tracing::Span::current().record("filename", file.filename.as_str());
        debug!(bytes = file.bytes.len(), "upload passed validation");

        let UploadedFile { filename, bytes } = file;
        let normalized = tokio::task::spawn_blocking(move || normalize::normalize(&bytes))
            .await
            .map_err(|e| PipelineError::Internal(format!("normalization task failed: {e}")))??;

        if normalized.len() > self.config.max_image_bytes {
            return Err(ValidationError::TooLargeAfterProcessing {
                max_mb: self.config.max_image_mb(),
            }
            .into());
        }

        let keys = StorageKeys::generate(&filename, Utc::now());
        let image_key = keys.image_key();
        let result_key = keys.result_key();
        let (width, height) = normalized.dimensions();
        debug!(
            %image_key,
            %result_key,
            bytes = normalized.len(),
            width,
            height,
            "normalized upload"
        );

        self.store
            .put_object(
                &self.config.input_bucket,
                &image_key,
                normalized.as_bytes(),
                NORMALIZED_CONTENT_TYPE,
            )
            .await?;
        info!(bucket = %self.config.input_bucket, %image_key, "stored normalized image");

        let labels = self
            .detector
            .detect_labels(
                normalized.as_bytes(),
                self.config.max_labels,
                self.config.min_confidence,
            )
            .await
            .inspect_err(|e| warn!(%image_key, error = %e, "label detection failed"))?;
        info!(count = labels.len(), "detected labels");

        let record = ResultRecord::new(
            &self.config.input_bucket,
            &image_key,
            labels,
            self.config.max_labels,
            self.config.min_confidence,
            Utc::now(),
        );
        let body = record
            .to_json_bytes()
            .map_err(|e| PipelineError::Internal(format!("failed to encode result record: {e}")))?;

        self.store
            .put_object(
                &self.config.output_bucket,
                &result_key,
                &body,
                RECORD_CONTENT_TYPE,
            )
            .await?;
        info!(bucket = %self.config.output_bucket, %result_key, "stored result record");

        let link = self
            .store
            .presigned_get_url(&self.config.output_bucket, &result_key, self.config.link_expiry)
            .await?;

        Ok(UploadOutcome {
            labels: record.labels,
            image_key,
            result_key,
            link,
        })
    }

    /// Issues a fresh retrieval link for a stored result record
    ///
    /// # Errors
    ///
    /// - `PipelineError::NotFound` if no record exists under the normalized key
    /// - `PipelineError::Storage` for any other store failure
    #[instrument(skip(self))]
    pub async fn lookup_result(&self, name: &str) -> PipelineResult<ResultLink> {
        if name.trim_matches('/').is_empty() {
            return Err(PipelineError::NotFound(name.to_string()));
        }

        let result_key = keys::result_key_for(name);
        let exists = self
            .store
            .object_exists(&self.config.output_bucket, &result_key)
            .await?;

        if !exists {
            debug!(%result_key, "result record not found");
            return Err(PipelineError::NotFound(name.to_string()));
        }

        let link = self
            .store
            .presigned_get_url(&self.config.output_bucket, &result_key, self.config.link_expiry)
            .await?;

        Ok(ResultLink { result_key, link })
    }

    /// Checks that both buckets are reachable
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Storage` from the first bucket that fails the check
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> PipelineResult<HealthStatus> {
        for bucket in [&self.config.input_bucket, &self.config.output_bucket] {
            self.store.check_bucket_reachable(bucket).await?;
        }

        Ok(HealthStatus {
            region: self.config.region.clone(),
            input_bucket: self.config.input_bucket.clone(),
            output_bucket: self.config.output_bucket.clone(),
        })
    }
}
