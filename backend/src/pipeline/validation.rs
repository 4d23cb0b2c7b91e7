//! Request checks that run before any external call

use super::{config::PipelineConfig, error::ValidationError, UploadRequest, UploadedFile};

/// Multipart framing may add overhead on top of the file itself, so the declared
/// request length is allowed to reach this multiple of the ceiling
pub const MULTIPART_OVERHEAD_FACTOR: usize = 2;

/// Lower-cased text after the last `.` of `filename`, if any
#[must_use]
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Whether `filename` carries an extension from the allow-list
#[must_use]
pub fn is_allowed_file(filename: &str, config: &PipelineConfig) -> bool {
    extension_of(filename).is_some_and(|ext| config.allowed_extensions.contains(&ext))
}

/// Checks presence, filename, extension and size, handing back the file on success
///
/// # Errors
///
/// Returns the first `ValidationError` the request trips, in that order
pub fn validate(
    request: UploadRequest,
    config: &PipelineConfig,
) -> Result<UploadedFile, ValidationError> {
    let file = request.file.ok_or(ValidationError::MissingFile)?;

    if file.filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if !is_allowed_file(&file.filename, config) {
        return Err(ValidationError::DisallowedExtension {
            allowed: config.allowed_extensions_display(),
        });
    }

    let declared_ceiling = config
        .max_image_bytes
        .saturating_mul(MULTIPART_OVERHEAD_FACTOR);
    let declared_too_large = request
        .declared_length
        .is_some_and(|len| usize::try_from(len).map_or(true, |len| len > declared_ceiling));

    if declared_too_large || file.bytes.len() > config.max_image_bytes {
        return Err(ValidationError::TooLarge {
            max_mb: config.max_image_mb(),
        });
    }

    Ok(file)
}
