//! Decoded, in-memory image source.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

use crate::error::IoError;
use crate::geometry::PixelRect;

use super::source::ImageSource;

/// An RGB image held in memory.
///
/// Cloning is cheap; the pixel buffer is shared.
#[derive(Debug, Clone)]
pub struct InMemoryImage {
    pixels: Arc<RgbImage>,
    bounds: Option<PixelRect>,
}

impl InMemoryImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            bounds: None,
        }
    }

    /// Decode an encoded image (JPEG or PNG).
    pub fn decode(bytes: &[u8]) -> Result<Self, IoError> {
        let image = image::load_from_memory(bytes).map_err(|e| IoError::Decode(e.to_string()))?;
        Ok(Self::from_dynamic(image))
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::new(image.to_rgb8())
    }

    /// Report `bounds` as the image's useful region.
    pub fn with_bounds(mut self, bounds: PixelRect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

impl ImageSource for InMemoryImage {
    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn bounding_box(&self) -> Option<PixelRect> {
        self.bounds
    }

    fn read_region(
        &self,
        origin: (u32, u32),
        downsample: u32,
        size: (u32, u32),
    ) -> Result<RgbImage, IoError> {
        let (width, height) = self.pixels.dimensions();
        let (x, y) = origin;
        let (out_width, out_height) = size;

        if x >= width || y >= height {
            return Err(IoError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        if out_width == 0 || out_height == 0 || downsample == 0 {
            return Err(IoError::Read(format!(
                "empty read: {}x{} at downsample {}",
                out_width, out_height, downsample
            )));
        }

        let span = |len: u32, remaining: u32| {
            (u64::from(len) * u64::from(downsample)).min(u64::from(remaining)) as u32
        };
        let span_width = span(out_width, width - x);
        let span_height = span(out_height, height - y);

        let crop = imageops::crop_imm(&*self.pixels, x, y, span_width, span_height).to_image();
        if (span_width, span_height) == size {
            return Ok(crop);
        }

        Ok(imageops::resize(&crop, out_width, out_height, FilterType::Triangle))
    }
}
