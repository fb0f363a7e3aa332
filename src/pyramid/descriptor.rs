//! Pyramid descriptor: level count, level dimensions and tile grids.

use serde::Serialize;

use crate::error::{ConfigError, TileError};
use crate::geometry::{effective_bounds, PixelRect};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default overlap border in pixels.
pub const DEFAULT_OVERLAP: u32 = 0;

// =============================================================================
// Configuration
// =============================================================================

/// Immutable pyramid settings shared by every descriptor built by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidConfig {
    /// Tile edge length in pixels, excluding overlap
    pub tile_size: u32,

    /// Extra border pixels on each interior tile edge
    pub overlap: u32,

    /// Compute the pyramid over the source's bounding box when it reports one
    pub limit_bounds: bool,
}

impl PyramidConfig {
    pub fn new(tile_size: u32, overlap: u32, limit_bounds: bool) -> Self {
        Self {
            tile_size,
            overlap,
            limit_bounds,
        }
    }

    /// Reject a zero tile size or an overlap that swallows the tile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if self.overlap >= self.tile_size {
            return Err(ConfigError::InvalidOverlap {
                overlap: self.overlap,
                tile_size: self.tile_size,
            });
        }
        Ok(())
    }
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE, DEFAULT_OVERLAP, true)
    }
}

// =============================================================================
// Level Information
// =============================================================================

/// Snapshot of one pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    /// Level index (0 = coarsest)
    pub level: u32,

    /// Width of this level in pixels
    pub width: u32,

    /// Height of this level in pixels
    pub height: u32,

    /// Number of tile columns
    pub tiles_x: u32,

    /// Number of tile rows
    pub tiles_y: u32,

    /// Downsample factor relative to full resolution
    pub downsample: u32,
}

// =============================================================================
// Descriptor
// =============================================================================

/// Number of levels for an image whose long side is `max(width, height)`.
///
/// `floor(log2(max)) + 1`, so the last level is full resolution and the first
/// has a long side of one or two pixels. Returns 0 for an empty image.
pub fn level_count_for(width: u32, height: u32) -> u32 {
    let longest = width.max(height);
    u32::BITS - longest.leading_zeros()
}

/// Full-resolution level index a Deep Zoom client derives from the image size.
///
/// `ceil(log2(max))`, so Deep Zoom level 0 is always 1x1. For non power-of-two
/// sizes this is one above [`level_count_for`]` - 1`.
pub fn deep_zoom_max_level(width: u32, height: u32) -> u32 {
    let longest = width.max(height);
    if longest <= 1 {
        return 0;
    }
    u32::BITS - (longest - 1).leading_zeros()
}

/// How a tile request numbers its levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LevelScheme {
    /// This crate's numbering: level 0 has a long side of one or two pixels
    #[default]
    Pyramid,

    /// Deep Zoom numbering: level 0 is 1x1, full resolution is
    /// [`deep_zoom_max_level`]
    DeepZoom,
}

/// Geometry of a Deep Zoom pyramid over one image.
///
/// All dimensions are computed against the pyramid's base, which is the raw
/// image or, in `limit_bounds` mode, the source's bounding box. Coordinates
/// handed to the image source are shifted by [`origin`](Self::origin).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidDescriptor {
    config: PyramidConfig,
    raw_width: u32,
    raw_height: u32,
    bounds: PixelRect,
    level_count: u32,
}

impl PyramidDescriptor {
    /// Describe a pyramid over a full `width x height` image.
    pub fn new(width: u32, height: u32, config: PyramidConfig) -> Result<Self, ConfigError> {
        Self::with_bounds(width, height, None, config)
    }

    /// Describe a pyramid over an image that may report a bounding box.
    ///
    /// The box is only honoured when `config.limit_bounds` is set.
    pub fn with_bounds(
        width: u32,
        height: u32,
        bounding_box: Option<PixelRect>,
        config: PyramidConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = effective_bounds(width, height, bounding_box, config.limit_bounds)?;

        Ok(Self {
            config,
            raw_width: width,
            raw_height: height,
            level_count: level_count_for(bounds.width(), bounds.height()),
            bounds,
        })
    }

    pub fn config(&self) -> PyramidConfig {
        self.config
    }

    pub fn tile_size(&self) -> u32 {
        self.config.tile_size
    }

    pub fn overlap(&self) -> u32 {
        self.config.overlap
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    /// Index of the full-resolution level.
    pub fn max_level(&self) -> u32 {
        self.level_count - 1
    }

    /// Full-resolution dimensions of the pyramid base.
    pub fn dimensions(&self) -> (u32, u32) {
        self.bounds.size()
    }

    /// Dimensions of the raw source image.
    pub fn raw_dimensions(&self) -> (u32, u32) {
        (self.raw_width, self.raw_height)
    }

    /// Region of the raw image covered by the pyramid.
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    /// Offset added to every coordinate before reading from the source.
    pub fn origin(&self) -> (u32, u32) {
        self.bounds.origin()
    }

    /// Downsample factor `2^(level_count - 1 - level)`.
    pub fn downsample(&self, level: u32) -> Option<u32> {
        if level >= self.level_count {
            return None;
        }
        Some(1u32 << (self.max_level() - level))
    }

    /// Dimensions of a level, never zero on either axis.
    pub fn level_dimensions(&self, level: u32) -> Option<(u32, u32)> {
        let downsample = self.downsample(level)?;
        let (width, height) = self.dimensions();
        Some((
            width.div_ceil(downsample).max(1),
            height.div_ceil(downsample).max(1),
        ))
    }

    /// Tile grid shape `(cols, rows)` of a level.
    pub fn tile_grid(&self, level: u32) -> Option<(u32, u32)> {
        let (width, height) = self.level_dimensions(level)?;
        let tile_size = self.config.tile_size;
        Some((width.div_ceil(tile_size), height.div_ceil(tile_size)))
    }

    pub fn level_info(&self, level: u32) -> Option<LevelInfo> {
        let (width, height) = self.level_dimensions(level)?;
        let (tiles_x, tiles_y) = self.tile_grid(level)?;
        let downsample = self.downsample(level)?;

        Some(LevelInfo {
            level,
            width,
            height,
            tiles_x,
            tiles_y,
            downsample,
        })
    }

    /// Number of levels a Deep Zoom client expects for this pyramid.
    pub fn deep_zoom_level_count(&self) -> u32 {
        let (width, height) = self.dimensions();
        deep_zoom_max_level(width, height) + 1
    }

    /// Translate a level numbered in `scheme` into this pyramid's numbering.
    ///
    /// Deep Zoom levels coarser than level 0 of the pyramid, or finer than
    /// full resolution, are `InvalidLevel`.
    pub fn resolve_level(&self, level: u32, scheme: LevelScheme) -> Result<u32, TileError> {
        match scheme {
            LevelScheme::Pyramid => Ok(level),
            LevelScheme::DeepZoom => {
                let level_count = self.deep_zoom_level_count();
                let offset = level_count - self.level_count;
                if level >= level_count {
                    return Err(TileError::InvalidLevel { level, level_count });
                }
                level
                    .checked_sub(offset)
                    .ok_or(TileError::InvalidLevel { level, level_count })
            }
        }
    }

    /// Every level, coarsest first.
    pub fn levels(&self) -> Vec<LevelInfo> {
        (0..self.level_count)
            .filter_map(|level| self.level_info(level))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
