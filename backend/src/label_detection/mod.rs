//! Label detection backed by AWS Rekognition
mod error;

use std::sync::Arc;

use aws_sdk_rekognition::{
    primitives::Blob,
    types::{Image, Label as RekognitionLabel},
    Client as RekognitionClient,
};
use serde::{Deserialize, Serialize};

pub use error::ClassificationError;

/// A detected label and the service's confidence in it (0-100, two decimals)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Label name, e.g. `Red`
    pub name: String,
    /// Confidence percentage rounded to two decimal places
    pub confidence: f64,
}

impl Label {
    /// Creates a label, rounding `confidence` to two decimal places
    #[must_use]
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence: (confidence * 100.0).round() / 100.0,
        }
    }
}

impl From<&RekognitionLabel> for Label {
    fn from(label: &RekognitionLabel) -> Self {
        Self::new(
            label.name().unwrap_or_default(),
            label.confidence().map_or(0.0, f64::from),
        )
    }
}

/// Label service operations the upload pipeline consumes
#[async_trait::async_trait]
pub trait LabelDetector: Send + Sync {
    /// Detects at most `max_labels` labels scoring at least `min_confidence`, in the
    /// order the service returns them
    async fn detect_labels(
        &self,
        image: &[u8],
        max_labels: i32,
        min_confidence: f32,
    ) -> Result<Vec<Label>, ClassificationError>;
}

/// Rekognition-backed label detector
pub struct RekognitionLabelDetector {
    client: Arc<RekognitionClient>,
}

impl RekognitionLabelDetector {
    /// Creates a detector around a pre-configured Rekognition client
    #[must_use]
    pub const fn new(client: Arc<RekognitionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl LabelDetector for RekognitionLabelDetector {
    /// Sends the image bytes inline with `DetectLabels`
    ///
    /// # Errors
    ///
    /// Returns `ClassificationError::InvalidImageFormat` when Rekognition cannot read the image
    /// Returns `ClassificationError::AccessDenied` when the role lacks permission
    /// Returns `ClassificationError::Service` for every other failure
    async fn detect_labels(
        &self,
        image: &[u8],
        max_labels: i32,
        min_confidence: f32,
    ) -> Result<Vec<Label>, ClassificationError> {
        let output = self
            .client
            .detect_labels()
            .image(Image::builder().bytes(Blob::new(image.to_vec())).build())
            .max_labels(max_labels)
            .min_confidence(min_confidence)
            .send()
            .await?;

        Ok(output.labels().iter().map(Label::from).collect())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Scripted label detector for tests

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{ClassificationError, Label, LabelDetector};

    /// Returns a fixed answer and counts how often it was asked
    pub struct MockLabelDetector {
        response: Result<Vec<Label>, ClassificationError>,
        calls: AtomicUsize,
    }

    impl MockLabelDetector {
        /// Detector that always returns `labels`
        #[must_use]
        pub const fn returning(labels: Vec<Label>) -> Self {
            Self {
                response: Ok(labels),
                calls: AtomicUsize::new(0),
            }
        }

        /// Detector that always fails with `error`
        #[must_use]
        pub const fn failing(error: ClassificationError) -> Self {
            Self {
                response: Err(error),
                calls: AtomicUsize::new(0),
            }
        }

        /// Number of `detect_labels` calls so far
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl LabelDetector for MockLabelDetector {
        async fn detect_labels(
            &self,
            _image: &[u8],
            max_labels: i32,
            _min_confidence: f32,
        ) -> Result<Vec<Label>, ClassificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let limit = usize::try_from(max_labels).unwrap_or(0);
            self.response
                .clone()
                .map(|labels| labels.into_iter().take(limit).collect())
        }
    }
}
