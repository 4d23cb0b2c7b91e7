//! Decode any supported upload and re-encode it as RGB JPEG

use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageError};

use super::error::PipelineError;

/// Content type of every normalized image
pub const NORMALIZED_CONTENT_TYPE: &str = "image/jpeg";

/// Output quality for the JPEG encoder
pub const JPEG_QUALITY: u8 = 90;

/// RGB JPEG buffer derived from an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl NormalizedImage {
    /// Encoded JPEG bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the encoded buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixel dimensions as (width, height)
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Decodes `input`, converts it to 8-bit RGB if needed and encodes it as JPEG
///
/// The output depends only on the input bytes.
///
/// # Errors
///
/// Returns `PipelineError::Decode` if the bytes are not a recognizable image or
/// re-encoding fails
pub fn normalize(input: &[u8]) -> Result<NormalizedImage, PipelineError> {
    let decoded = image::load_from_memory(input).map_err(|err| match err {
        ImageError::Unsupported(_) | ImageError::Decoding(_) => {
            PipelineError::Decode("Uploaded file is not a valid image.".to_string())
        }
        other => processing_failed(&other),
    })?;

    let rgb = match decoded {
        DynamicImage::ImageRgb8(_) => decoded,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let mut bytes = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))
        .map_err(|err| processing_failed(&err))?;

    Ok(NormalizedImage {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
    })
}

fn processing_failed(err: &ImageError) -> PipelineError {
    PipelineError::Decode(format!("Image processing failed: {err}"))
}
