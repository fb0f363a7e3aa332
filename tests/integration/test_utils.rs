//! Test utilities for integration tests.
//!
//! Provides an in-memory slide source and helpers for building test images
//! and inspecting encoded tiles.

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wsi_deepzoom::error::IoError;
use wsi_deepzoom::slide::{InMemoryImage, SlideListResult, SlideSource};

// =============================================================================
// Mock Slide Source
// =============================================================================

/// A slide source that serves pre-decoded images and counts opens.
pub struct MockSlideSource {
    slides: HashMap<String, InMemoryImage>,
    open_count: Arc<AtomicUsize>,
}

impl MockSlideSource {
    pub fn new() -> Self {
        Self {
            slides: HashMap::new(),
            open_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_slide(mut self, slide_id: impl Into<String>, image: InMemoryImage) -> Self {
        self.slides.insert(slide_id.into(), image);
        self
    }

    /// Shared counter, readable after the source moves into a service.
    pub fn open_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.open_count)
    }
}

impl Default for MockSlideSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlideSource for MockSlideSource {
    type Image = InMemoryImage;

    async fn open(&self, slide_id: &str) -> Result<Self::Image, IoError> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        self.slides
            .get(slide_id)
            .cloned()
            .ok_or_else(|| IoError::NotFound(slide_id.to_string()))
    }

    async fn list_slides(&self) -> Result<SlideListResult, IoError> {
        let mut slides: Vec<String> = self.slides.keys().cloned().collect();
        slides.sort();
        Ok(SlideListResult { slides })
    }
}

// =============================================================================
// Test Images
// =============================================================================

/// An RGB gradient that differs along both axes.
pub fn gradient_image(width: u32, height: u32) -> InMemoryImage {
    InMemoryImage::new(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

/// The 1000x800 image most tests run against.
pub fn sample_source() -> MockSlideSource {
    MockSlideSource::new().with_slide("sample.jpg", gradient_image(1000, 800))
}

// =============================================================================
// Validation Helpers
// =============================================================================

/// Check if data is a valid JPEG.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }

    // SOI marker
    if data[0] != 0xFF || data[1] != 0xD8 {
        return false;
    }

    // EOI marker
    if data[data.len() - 2] != 0xFF || data[data.len() - 1] != 0xD9 {
        return false;
    }

    image::load_from_memory_with_format(data, image::ImageFormat::Jpeg).is_ok()
}

/// Decode a JPEG and return its dimensions.
pub fn jpeg_dimensions(data: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg).unwrap();
    (image.width(), image.height())
}
