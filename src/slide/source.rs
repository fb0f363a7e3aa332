//! Source traits consumed by the engine.

use async_trait::async_trait;
use image::RgbImage;

use crate::error::IoError;
use crate::geometry::PixelRect;

// =============================================================================
// ImageSource Trait
// =============================================================================

/// Read-only access to one (possibly huge) image.
///
/// Implementations must be safe to read from concurrently; the engine never
/// mutates a source.
pub trait ImageSource: Send + Sync {
    /// Raw `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Useful sub-rectangle of the raw image, if the source knows one.
    ///
    /// Only consulted in `limit_bounds` mode.
    fn bounding_box(&self) -> Option<PixelRect> {
        None
    }

    /// Read pixels at a downsample factor.
    ///
    /// The read covers `size * downsample` raw pixels starting at `origin`
    /// (raw coordinates), clamped to the image, and is scaled to exactly
    /// `size`.
    ///
    /// # Errors
    ///
    /// Returns an error when `origin` lies outside the image or the pixels
    /// cannot be produced.
    fn read_region(
        &self,
        origin: (u32, u32),
        downsample: u32,
        size: (u32, u32),
    ) -> Result<RgbImage, IoError>;
}

// =============================================================================
// SlideSource Trait
// =============================================================================

/// Result of listing slides.
#[derive(Debug, Clone, Default)]
pub struct SlideListResult {
    /// Slide identifiers, sorted
    pub slides: Vec<String>,
}

/// Opens image handles by slide identifier.
///
/// Each call to [`open`](Self::open) yields an owned handle; the caller drops
/// it when its request is done.
#[async_trait]
pub trait SlideSource: Send + Sync {
    /// The image handle this source produces.
    type Image: ImageSource + 'static;

    /// Open the slide with the given identifier.
    ///
    /// Returns `IoError::NotFound` when no such slide exists.
    async fn open(&self, slide_id: &str) -> Result<Self::Image, IoError>;

    /// List the identifiers of all available slides.
    async fn list_slides(&self) -> Result<SlideListResult, IoError>;
}
