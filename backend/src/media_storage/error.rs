//! Error types for bucket operations

use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    operation::{
        get_object::GetObjectError, head_bucket::HeadBucketError, head_object::HeadObjectError,
        put_object::PutObjectError,
    },
};
use thiserror::Error;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors that can occur during bucket operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BucketError {
    /// The store answered with an error (permissions, missing bucket, ...)
    #[error("{0}")]
    S3Error(String),

    /// Request never got a response (DNS, connection, timeout, credentials)
    #[error("{0}")]
    AwsError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Upstream service error (5xx from S3)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),
}

impl BucketError {
    /// Whether the store itself rejected the request, as opposed to never being reached
    #[must_use]
    pub const fn is_service_rejection(&self) -> bool {
        matches!(self, Self::S3Error(_) | Self::UpstreamError(_))
    }
}

/// Best human-readable message for a service error: the service's own message, then its
/// error code, then the HTTP status
fn service_message<E: ProvideErrorMetadata>(err: &E, status: u16) -> String {
    err.message()
        .or_else(|| err.code())
        .map_or_else(|| format!("HTTP {status}"), ToString::to_string)
}

macro_rules! impl_from_sdk_error {
    ($($op_error:ty),+ $(,)?) => {
        $(
            impl From<SdkError<$op_error>> for BucketError {
                fn from(error: SdkError<$op_error>) -> Self {
                    match error {
                        SdkError::ServiceError(err) => {
                            let status = err.raw().status().as_u16();
                            let message = service_message(err.err(), status);
                            if status >= 500 {
                                Self::UpstreamError(message)
                            } else {
                                Self::S3Error(message)
                            }
                        }
                        _ => Self::AwsError(error.to_string()),
                    }
                }
            }
        )+
    };
}

impl_from_sdk_error!(PutObjectError, HeadObjectError, HeadBucketError, GetObjectError);
