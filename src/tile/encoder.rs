//! JPEG encoding of tile and region pixels.
//!
//! # Design Decisions
//!
//! - **Encode only**: pixels arrive decoded from the image source, so the
//!   encoder never sees source container bytes.
//!
//! - **Exact size**: the encoder never resizes. Edge tiles come out at their
//!   true clamped size.
//!
//! - **Quality control**: JPEG quality is configurable per request, allowing
//!   clients to trade off file size vs image quality.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, RgbImage};
use std::io::Cursor;

use crate::error::{IoError, TileError};

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// JPEG Encoder
// =============================================================================

/// Encodes RGB pixel buffers as baseline JPEG.
///
/// # Example
///
/// ```
/// use wsi_deepzoom::tile::JpegTileEncoder;
/// use image::RgbImage;
///
/// let encoder = JpegTileEncoder::new();
/// let jpeg = encoder.encode(&RgbImage::new(232, 32), 85).unwrap();
/// assert_eq!(encoder.dimensions(&jpeg).unwrap(), (232, 32));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JpegTileEncoder {}

impl JpegTileEncoder {
    pub fn new() -> Self {
        Self {}
    }

    /// Encode pixels at the specified quality.
    ///
    /// Quality is clamped to 1-100; callers validate user input beforehand.
    pub fn encode(&self, pixels: &RgbImage, quality: u8) -> Result<Bytes, TileError> {
        let quality = clamp_quality(quality);

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);

        encoder
            .encode_image(pixels)
            .map_err(|e| TileError::EncodeError {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }

    /// Read `(width, height)` from JPEG data without decoding the pixels.
    pub fn dimensions(&self, jpeg: &[u8]) -> Result<(u32, u32), TileError> {
        let reader = ImageReader::with_format(Cursor::new(jpeg), image::ImageFormat::Jpeg);

        let dimensions = reader
            .into_dimensions()
            .map_err(|e| IoError::Decode(e.to_string()))?;

        Ok(dimensions)
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
