//! Error types for label detection

use aws_sdk_rekognition::{
    error::{ProvideErrorMetadata, SdkError},
    operation::detect_labels::DetectLabelsError,
};
use thiserror::Error;

/// Reasons the label service refused to classify an image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The service could not parse the submitted image
    #[error("Uploaded image format is invalid. Please use JPEG or PNG.")]
    InvalidImageFormat,

    /// The caller's credentials lack permission for label detection
    #[error("Rekognition access denied. Check IAM role/permissions for Rekognition.")]
    AccessDenied,

    /// Any other service or transport failure
    #[error("AWS client error: {0}")]
    Service(String),
}

impl From<SdkError<DetectLabelsError>> for ClassificationError {
    fn from(error: SdkError<DetectLabelsError>) -> Self {
        match error {
            SdkError::ServiceError(err) => match err.err() {
                DetectLabelsError::InvalidImageFormatException(_) => Self::InvalidImageFormat,
                DetectLabelsError::AccessDeniedException(_) => Self::AccessDenied,
                other => Self::Service(
                    other
                        .message()
                        .or_else(|| other.code())
                        .unwrap_or("unknown Rekognition error")
                        .to_string(),
                ),
            },
            _ => Self::Service(error.to_string()),
        }
    }
}
