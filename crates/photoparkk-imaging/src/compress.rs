// crates/photoparkk-imaging/src/compress.rs
// ============================================================================
// Module: Image Compression
// Description: Decode, downscale, and JPEG re-encode with one fallback pass.
// Purpose: Cap image dimensions and approximately bound encoded size.
// Dependencies: image, thiserror
// ============================================================================

//! ## Overview
//! [`compress_image`] decodes any supported image, scales it uniformly so
//! its longer side is at most [`CompressionOptions::max_dimension`], and
//! encodes it as JPEG at [`CompressionOptions::quality`]. When the result
//! exceeds [`CompressionOptions::target_bytes`] it is re-encoded once at
//! [`CompressionOptions::fallback_quality`] and accepted as is.
//!
//! The dimension cap is a guarantee; the byte target is not. Callers learn
//! whether the target was met from [`CompressedImage::within_target`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use image::DynamicImage;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MIME type of every compressed output.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// Default cap on the longer side, in pixels.
const DEFAULT_MAX_DIMENSION: u32 = 1200;

/// Default byte target (5,000 KB).
const DEFAULT_TARGET_BYTES: usize = 5_000 * 1024;

/// Default first-pass JPEG quality.
const DEFAULT_QUALITY: u8 = 80;

/// Default second-pass JPEG quality.
const DEFAULT_FALLBACK_QUALITY: u8 = 70;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Compression settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Maximum length of the longer side, in pixels.
    pub max_dimension: u32,
    /// Encoded size above which the fallback pass runs.
    pub target_bytes: usize,
    /// First-pass JPEG quality (1-100).
    pub quality: u8,
    /// Second-pass JPEG quality (1-100).
    pub fallback_quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            target_bytes: DEFAULT_TARGET_BYTES,
            quality: DEFAULT_QUALITY,
            fallback_quality: DEFAULT_FALLBACK_QUALITY,
        }
    }
}

impl CompressionOptions {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`CompressionError::InvalidOptions`] when a value is out of range.
    pub fn validate(&self) -> Result<(), CompressionError> {
        if self.max_dimension == 0 {
            return Err(CompressionError::InvalidOptions(
                "max_dimension must be greater than zero".to_string(),
            ));
        }
        if self.target_bytes == 0 {
            return Err(CompressionError::InvalidOptions(
                "target_bytes must be greater than zero".to_string(),
            ));
        }
        let qualities = [("quality", self.quality), ("fallback_quality", self.fallback_quality)];
        for (label, quality) in qualities {
            if !(1 ..= 100).contains(&quality) {
                return Err(CompressionError::InvalidOptions(format!(
                    "{label} must be between 1 and 100"
                )));
            }
        }
        if self.fallback_quality > self.quality {
            return Err(CompressionError::InvalidOptions(
                "fallback_quality must not exceed quality".to_string(),
            ));
        }
        Ok(())
    }
}

/// Compressed image output.
#[derive(Clone, PartialEq, Eq)]
pub struct CompressedImage {
    /// JPEG bytes.
    pub bytes: Vec<u8>,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// JPEG quality of the accepted pass.
    pub quality_used: u8,
    /// Whether the output is within the byte target.
    pub within_target: bool,
}

impl std::fmt::Debug for CompressedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressedImage")
            .field("len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("quality_used", &self.quality_used)
            .field("within_target", &self.within_target)
            .finish()
    }
}

/// Compression errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    /// Settings are out of range.
    #[error("invalid compression options: {0}")]
    InvalidOptions(String),
    /// Input could not be decoded as an image.
    #[error("image could not be decoded: {0}")]
    Decode(String),
    /// Output could not be encoded.
    #[error("image could not be encoded: {0}")]
    Encode(String),
    /// Another compression holds the slot.
    #[error("a compression is already in progress for slot {0}")]
    SlotBusy(String),
    /// Slot registry lock was poisoned.
    #[error("upload slot registry unavailable: {0}")]
    Slots(String),
}

// ============================================================================
// SECTION: Compression
// ============================================================================

/// Returns the dimensions after capping the longer side at `max_dimension`.
///
/// Images already within the cap are returned unchanged. The shorter side is
/// rounded to the nearest pixel and never drops below one.
#[must_use]
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_dimension || longer == 0 {
        return (width, height);
    }
    let scale = |side: u32| -> u32 {
        let scaled = (u64::from(side) * u64::from(max_dimension) + u64::from(longer) / 2)
            / u64::from(longer);
        u32::try_from(scaled).unwrap_or(max_dimension).clamp(1, max_dimension)
    };
    if width >= height {
        (max_dimension, scale(height))
    } else {
        (scale(width), max_dimension)
    }
}

/// Compresses an image.
///
/// # Errors
///
/// Returns [`CompressionError`] when the options are invalid, the input is not
/// a decodable image, or encoding fails.
pub fn compress_image(
    input: &[u8],
    options: &CompressionOptions,
) -> Result<CompressedImage, CompressionError> {
    options.validate()?;
    let decoded =
        image::load_from_memory(input).map_err(|err| CompressionError::Decode(err.to_string()))?;
    let bitmap = downscale(decoded, options.max_dimension);
    let (width, height) = bitmap.dimensions();

    let first = encode_jpeg(&bitmap, options.quality)?;
    if first.len() <= options.target_bytes {
        return Ok(CompressedImage {
            bytes: first,
            width,
            height,
            quality_used: options.quality,
            within_target: true,
        });
    }
    let second = encode_jpeg(&bitmap, options.fallback_quality)?;
    let within_target = second.len() <= options.target_bytes;
    Ok(CompressedImage {
        bytes: second,
        width,
        height,
        quality_used: options.fallback_quality,
        within_target,
    })
}

/// Flattens to RGB and resizes when the longer side exceeds the cap.
fn downscale(image: DynamicImage, max_dimension: u32) -> RgbImage {
    let (width, height) = (image.width(), image.height());
    let (target_width, target_height) = scaled_dimensions(width, height, max_dimension);
    if (target_width, target_height) == (width, height) {
        return image.to_rgb8();
    }
    image.resize_exact(target_width, target_height, FilterType::Lanczos3).to_rgb8()
}

/// Encodes an RGB bitmap as JPEG.
fn encode_jpeg(bitmap: &RgbImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(bitmap)
        .map_err(|err| CompressionError::Encode(err.to_string()))?;
    Ok(out)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
