use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::Serialize;

use crate::error::{ConfigError, TileError};
use crate::geometry::{clamp_span, effective_bounds, PixelRect};
use crate::slide::ImageSource;

// =============================================================================
// Request Types
// =============================================================================

/// Caller-supplied rectangle in full-resolution pixels.
///
/// Signed so that rectangles hanging off the top or left edge can be
/// expressed; the extractor clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl ViewportRect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Display size the caller wants the region fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetWindow {
    pub width: i64,
    pub height: i64,
}

impl TargetWindow {
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Build a target from optional request fields.
    ///
    /// Both fields or neither must be present. Supplying only one is an
    /// `InvalidArgument`.
    pub fn from_parts(
        width: Option<i64>,
        height: Option<i64>,
    ) -> Result<Option<Self>, TileError> {
        match (width, height) {
            (Some(width), Some(height)) => Ok(Some(Self::new(width, height))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(TileError::InvalidArgument {
                message: "target_w given without target_h".to_string(),
            }),
            (None, Some(_)) => Err(TileError::InvalidArgument {
                message: "target_h given without target_w".to_string(),
            }),
        }
    }

    /// Non-positive targets mean "no resample".
    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Output size for a crop fitted inside `target`, preserving aspect ratio.
///
/// Returns `None` when the target is not usable. The result may be larger
/// than the crop (upscaling) and is at least 1x1. It is not bounded; check it
/// against [`OutputLimits`] before allocating.
pub fn fit_within(crop: (u32, u32), target: TargetWindow) -> Option<(u64, u64)> {
    if !target.is_usable() || crop.0 == 0 || crop.1 == 0 {
        return None;
    }

    let (crop_width, crop_height) = (f64::from(crop.0), f64::from(crop.1));
    let scale = (target.width as f64 / crop_width).min(target.height as f64 / crop_height);

    let scaled = |len: f64| (len * scale).round().max(1.0) as u64;
    Some((scaled(crop_width), scaled(crop_height)))
}

/// Longest side a baseline JPEG can carry.
pub const DEFAULT_MAX_OUTPUT_SIDE: u32 = 65_535;

/// Default pixel budget for one region (64 Mpx, about 192 MiB of RGB).
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 64 * 1024 * 1024;

/// Largest region the extractor will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLimits {
    /// Maximum width or height in pixels
    pub max_side: u32,

    /// Maximum `width * height`
    pub max_pixels: u64,
}

impl OutputLimits {
    pub fn new(max_side: u32, max_pixels: u64) -> Self {
        Self {
            max_side,
            max_pixels,
        }
    }

    /// Accept an output size, or reject it as `InvalidArgument`.
    pub fn check(&self, size: (u64, u64)) -> Result<(u32, u32), TileError> {
        let (width, height) = size;
        let max_side = u64::from(self.max_side);

        if width > max_side || height > max_side {
            return Err(TileError::InvalidArgument {
                message: format!(
                    "Region output {}x{} exceeds the maximum side of {} pixels",
                    width, height, self.max_side
                ),
            });
        }
        if width.saturating_mul(height) > self.max_pixels {
            return Err(TileError::InvalidArgument {
                message: format!(
                    "Region output {}x{} exceeds the budget of {} pixels",
                    width, height, self.max_pixels
                ),
            });
        }

        // Both sides are at most max_side, a u32
        Ok((width as u32, height as u32))
    }
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OUTPUT_SIDE, DEFAULT_MAX_OUTPUT_PIXELS)
    }
}

// =============================================================================
// Results
// =============================================================================

/// A clamped crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionCrop {
    /// Crop in pyramid coordinates (relative to the bounds origin)
    pub local: PixelRect,

    /// Crop in raw source coordinates
    pub raw: PixelRect,
}

impl RegionCrop {
    pub fn size(&self) -> (u32, u32) {
        self.local.size()
    }
}

/// Normalized viewport summary of an extracted region.
///
/// A convenience value for whatever records views; the engine never stores
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewSummary {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
}

/// Pixels of an extracted region with the geometry that produced them.
#[derive(Debug, Clone)]
pub struct ExtractedRegion {
    pub image: RgbImage,
    pub crop: RegionCrop,

    /// Final output size (after any resample)
    pub size: (u32, u32),

    pub summary: ViewSummary,
}

// =============================================================================
// RegionExtractor
// =============================================================================

/// Clamps viewport rectangles to an image and reads them at full resolution.
///
/// With `limit_bounds` and a reported bounding box, rectangles are taken
/// relative to the box, the same coordinate space tiles use.
#[derive(Debug, Clone, Copy)]
pub struct RegionExtractor {
    bounds: PixelRect,
    limits: OutputLimits,
}

impl RegionExtractor {
    pub fn new<I>(image: &I, limit_bounds: bool) -> Result<Self, ConfigError>
    where
        I: ImageSource + ?Sized,
    {
        let (width, height) = image.dimensions();
        let bounds = effective_bounds(width, height, image.bounding_box(), limit_bounds)?;
        Ok(Self {
            bounds,
            limits: OutputLimits::default(),
        })
    }

    pub fn with_limits(mut self, limits: OutputLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> OutputLimits {
        self.limits
    }

    /// `(W, H)` the rectangles are clamped against.
    pub fn dimensions(&self) -> (u32, u32) {
        self.bounds.size()
    }

    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    /// Clamp a rectangle so that `0 <= x0 < x1 <= W` and `0 <= y0 < y1 <= H`.
    pub fn crop(&self, rect: ViewportRect) -> RegionCrop {
        let (width, height) = self.dimensions();
        let (x0, x1) = clamp_span(rect.x, rect.width, width);
        let (y0, y1) = clamp_span(rect.y, rect.height, height);

        let local = PixelRect::new(x0, y0, x1, y1);
        RegionCrop {
            local,
            raw: local.offset(self.bounds.x0, self.bounds.y0),
        }
    }

    /// Normalized center and approximate zoom of a crop.
    pub fn summarize(&self, crop: &RegionCrop) -> ViewSummary {
        let (width, height) = self.dimensions();
        let (width, height) = (f64::from(width), f64::from(height));
        let (crop_width, crop_height) = crop.size();
        let (crop_width, crop_height) = (f64::from(crop_width), f64::from(crop_height));

        ViewSummary {
            center_x: (f64::from(crop.local.x0) + crop_width / 2.0) / width,
            center_y: (f64::from(crop.local.y0) + crop_height / 2.0) / height,
            zoom: (width / crop_width).max(height / crop_height),
        }
    }

    /// Clamp, read and optionally resample a region.
    ///
    /// # Errors
    ///
    /// An output larger than the extractor's [`OutputLimits`] is
    /// `InvalidArgument`, raised before any pixels are read. Read failures
    /// surface as `TileError::Io`. Out-of-range rectangles are not errors.
    pub fn extract<I>(
        &self,
        image: &I,
        rect: ViewportRect,
        target: Option<TargetWindow>,
    ) -> Result<ExtractedRegion, TileError>
    where
        I: ImageSource + ?Sized,
    {
        let crop = self.crop(rect);
        let crop_size = crop.size();
        let fitted = target
            .and_then(|t| fit_within(crop_size, t))
            .unwrap_or((u64::from(crop_size.0), u64::from(crop_size.1)));
        let (out_width, out_height) = self.limits.check(fitted)?;

        let pixels = image.read_region(crop.raw.origin(), 1, crop_size)?;
        let pixels = if (out_width, out_height) != crop_size {
            imageops::resize(&pixels, out_width, out_height, FilterType::Lanczos3)
        } else {
            pixels
        };

        let size = pixels.dimensions();
        Ok(ExtractedRegion {
            image: pixels,
            crop,
            size,
            summary: self.summarize(&crop),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
