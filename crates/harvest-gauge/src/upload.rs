//! Upload checks and decoding to grayscale.

use crate::HarvestError;
use image::{GrayImage, ImageError, ImageFormat};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Jpeg,
    Png,
}

impl UploadFormat {
    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub max_bytes: usize,
    pub allowed_formats: Vec<UploadFormat>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_formats: vec![UploadFormat::Jpeg, UploadFormat::Png],
        }
    }
}

/// Check size and sniff the format from the leading bytes.
pub fn validate_upload(bytes: &[u8], limits: &UploadLimits) -> Result<UploadFormat, HarvestError> {
    if bytes.is_empty() {
        return Err(HarvestError::EmptyUpload);
    }
    if bytes.len() > limits.max_bytes {
        return Err(HarvestError::UploadTooLarge {
            size: bytes.len(),
            limit: limits.max_bytes,
        });
    }

    let format = image::guess_format(bytes)
        .map_err(|_| HarvestError::UnsupportedFormat("unknown".to_string()))?;
    limits
        .allowed_formats
        .iter()
        .copied()
        .find(|f| f.image_format() == format)
        .ok_or_else(|| HarvestError::UnsupportedFormat(format!("{format:?}")))
}

/// Validate and decode an upload into an 8-bit grayscale image.
pub fn decode_gray(bytes: &[u8], limits: &UploadLimits) -> Result<GrayImage, HarvestError> {
    let format = validate_upload(bytes, limits)?;
    let img = image::load_from_memory_with_format(bytes, format.image_format())
        .map_err(|e| match e {
            ImageError::Limits(_) => HarvestError::Processing(e.to_string()),
            _ => HarvestError::MalformedImage(e.to_string()),
        })?
        .to_luma8();
    debug!("decoded {format:?} upload: {}x{}", img.width(), img.height());
    Ok(img)
}
