//! Pixel rectangle helpers shared by the pyramid and region modules.

use serde::Serialize;

use crate::error::ConfigError;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    /// Create a rectangle from its corners.
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle from an origin and a size.
    pub fn from_origin_size(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(width),
            y1: y.saturating_add(height),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// `(x0, y0)`
    pub fn origin(&self) -> (u32, u32) {
        (self.x0, self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Translate by `(dx, dy)`.
    pub fn offset(&self, dx: u32, dy: u32) -> Self {
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &PixelRect) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }
}

/// Resolve the part of a raw image that a pyramid covers.
///
/// With `limit_bounds` set and a bounding box reported, the box is validated
/// against the raw dimensions and returned; otherwise the whole image is used.
pub fn effective_bounds(
    width: u32,
    height: u32,
    bounding_box: Option<PixelRect>,
    limit_bounds: bool,
) -> Result<PixelRect, ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::InvalidDimensions { width, height });
    }

    let full = PixelRect::new(0, 0, width, height);
    match bounding_box {
        Some(bounds) if limit_bounds => {
            if bounds.is_empty() || !full.contains(&bounds) {
                return Err(ConfigError::InvalidBounds {
                    x: bounds.x0,
                    y: bounds.y0,
                    width: bounds.width(),
                    height: bounds.height(),
                    image_width: width,
                    image_height: height,
                });
            }
            Ok(bounds)
        }
        _ => Ok(full),
    }
}

/// Clamp the span `[start, start + len)` into `[0, extent)` so that at least
/// one pixel survives.
///
/// Returns `(lo, hi)` with `0 <= lo < hi <= extent`. `extent` must be non-zero.
pub fn clamp_span(start: i64, len: i64, extent: u32) -> (u32, u32) {
    let extent = i64::from(extent.max(1));
    let lo = start.clamp(0, extent - 1);
    let hi = start.saturating_add(len).clamp(lo + 1, extent);
    (lo as u32, hi as u32)
}
