//! Environment configuration for different deployment stages

use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use tracing::Level;

use crate::pipeline::PipelineConfig;

/// Extensions accepted when `ALLOWED_EXTENSIONS` is not set
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// Upload ceiling when `MAX_IMAGE_BYTES` is not set (10 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MAX_LABELS: i32 = 10;
const DEFAULT_MIN_CONFIDENCE: f32 = 50.0;
const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 60 * 60;
const DEFAULT_PORT: u16 = 5000;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let presign_expiry_override = env::var("PRESIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Self::Development {
                    presign_expiry_override,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Bucket receiving normalized source images
    ///
    /// # Panics
    ///
    /// Panics if `INPUT_BUCKET` is not set outside of development
    #[must_use]
    pub fn input_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("INPUT_BUCKET").expect("INPUT_BUCKET environment variable is not set")
            }
            Self::Development { .. } => {
                env::var("INPUT_BUCKET").unwrap_or_else(|_| "traywise-videos".to_string())
            }
        }
    }

    /// Bucket receiving result records
    ///
    /// # Panics
    ///
    /// Panics if `OUTPUT_BUCKET` is not set outside of development
    #[must_use]
    pub fn output_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("OUTPUT_BUCKET").expect("OUTPUT_BUCKET environment variable is not set")
            }
            Self::Development { .. } => {
                env::var("OUTPUT_BUCKET").unwrap_or_else(|_| "traywise-outputs".to_string())
            }
        }
    }

    /// AWS region, `AWS_DEFAULT_REGION` taking precedence over `AWS_REGION`
    #[must_use]
    pub fn region(&self) -> String {
        env::var("AWS_DEFAULT_REGION")
            .or_else(|_| env::var("AWS_REGION"))
            .unwrap_or_else(|_| DEFAULT_REGION.to_string())
    }

    /// Maximum number of labels requested from the label service
    #[must_use]
    pub fn max_labels(&self) -> i32 {
        env::var("REK_MAX_LABELS")
            .ok()
            .and_then(|val| val.parse::<i32>().ok())
            .filter(|val| *val > 0)
            .unwrap_or(DEFAULT_MAX_LABELS)
    }

    /// Minimum confidence (0-100) a label needs to be returned
    #[must_use]
    pub fn min_confidence(&self) -> f32 {
        env::var("REK_MIN_CONFIDENCE")
            .ok()
            .and_then(|val| val.parse::<f32>().ok())
            .filter(|val| (0.0..=100.0).contains(val))
            .unwrap_or(DEFAULT_MIN_CONFIDENCE)
    }

    /// Lower-cased file extensions accepted for upload
    #[must_use]
    pub fn allowed_extensions(&self) -> BTreeSet<String> {
        let configured: BTreeSet<String> = env::var("ALLOWED_EXTENSIONS")
            .map(|val| {
                val.split(',')
                    .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if configured.is_empty() {
            DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect()
        } else {
            configured
        }
    }

    /// Upload size ceiling in bytes, applied before and after normalization
    #[must_use]
    pub fn max_image_bytes(&self) -> usize {
        env::var("MAX_IMAGE_BYTES")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .filter(|val| *val > 0)
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES)
    }

    /// Port the HTTP server binds to
    #[must_use]
    pub fn port(&self) -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with a single attempt per call and an operation timeout
    ///
    /// Failed calls surface to the caller immediately; nothing in the service retries.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::disabled();

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .region(Region::new(self.region()))
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// AWS Rekognition service configuration
    pub async fn rekognition_client_config(&self) -> aws_sdk_rekognition::Config {
        let aws_config = self.aws_config().await;
        (&aws_config).into()
    }

    /// Presigned URL expiry time in seconds
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => env::var("PRESIGNED_URL_EXPIRY_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
            Self::Development {
                presign_expiry_override,
            } => presign_expiry_override.unwrap_or(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
        }
    }

    /// Everything the upload pipeline needs, resolved once at startup
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            input_bucket: self.input_bucket(),
            output_bucket: self.output_bucket(),
            region: self.region(),
            max_labels: self.max_labels(),
            min_confidence: self.min_confidence(),
            allowed_extensions: self.allowed_extensions(),
            max_image_bytes: self.max_image_bytes(),
            link_expiry: Duration::from_secs(self.presigned_url_expiry_secs()),
        }
    }

    /// Default log level when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}
