//! Error taxonomy for the upload pipeline

use thiserror::Error;

use crate::{label_detection::ClassificationError, media_storage::BucketError};

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Client input rejected before any external call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No `image` field in the request
    #[error("No file part in the request.")]
    MissingFile,

    /// The `image` field carried no filename
    #[error("No file selected.")]
    EmptyFilename,

    /// Extension outside the allow-list
    #[error("Unsupported file type. Allowed: {allowed}")]
    DisallowedExtension {
        /// Sorted, comma separated allow-list
        allowed: String,
    },

    /// Declared or received size above the ceiling
    #[error("File too large. Max {max_mb} MB.")]
    TooLarge {
        /// Ceiling in megabytes
        max_mb: usize,
    },

    /// Normalized buffer above the ceiling
    #[error("Image too large after processing. Max {max_mb} MB.")]
    TooLargeAfterProcessing {
        /// Ceiling in megabytes
        max_mb: usize,
    },
}

/// Every way an upload, lookup or health probe can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Bad client input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Bytes could not be turned into a normalized image
    #[error("{0}")]
    Decode(String),

    /// Content store failure
    #[error("AWS client error: {0}")]
    Storage(#[from] BucketError),

    /// Label service failure
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// Requested result record does not exist
    #[error("Error locating results for '{0}': result does not exist")]
    NotFound(String),

    /// Failure inside the service itself (worker panic, serialization)
    #[error("Unexpected error: {0}")]
    Internal(String),
}
