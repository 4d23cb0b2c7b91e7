use std::collections::BTreeSet;
use std::time::Duration;

/// Settings the upload pipeline runs with, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Bucket receiving normalized source images
    pub input_bucket: String,
    /// Bucket receiving result records
    pub output_bucket: String,
    /// AWS region, reported by the health probe
    pub region: String,
    /// Maximum number of labels requested per image
    pub max_labels: i32,
    /// Minimum confidence (0-100) a label needs to be returned
    pub min_confidence: f32,
    /// Lower-cased extensions accepted for upload
    pub allowed_extensions: BTreeSet<String>,
    /// Size ceiling in bytes, enforced before and after normalization
    pub max_image_bytes: usize,
    /// Lifetime of retrieval links
    pub link_expiry: Duration,
}

impl PipelineConfig {
    /// Size ceiling in whole megabytes, for user-facing messages
    #[must_use]
    pub const fn max_image_mb(&self) -> usize {
        self.max_image_bytes / (1024 * 1024)
    }

    /// Allowed extensions, sorted and comma separated
    #[must_use]
    pub fn allowed_extensions_display(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
