//! Tile addressing: `(level, col, row)` to pixel rectangles.
//!
//! A tile covers `tile_size` pixels of its level plus `overlap` pixels on every
//! side that has a neighbour. Edge tiles are truncated to what is left of the
//! level, never padded:
//!
//! ```text
//!   col 0          col 1            col 2 (last)
//! |<- ts ->|<ov  |<-ov  ts  ov->|  |<-ov  rest ->|
//! ```

use image::RgbImage;

use crate::error::TileError;
use crate::geometry::PixelRect;
use crate::slide::ImageSource;

use super::descriptor::PyramidDescriptor;

/// Pixel geometry of one addressed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    pub level: u32,
    pub col: u32,
    pub row: u32,

    /// Downsample factor of the level
    pub downsample: u32,

    /// Tile rectangle in level-local coordinates, overlap included
    pub local: PixelRect,

    /// The tile's own cell in level-local coordinates, overlap excluded
    pub interior: PixelRect,

    /// Tile rectangle in raw source coordinates, bounds origin applied
    pub full_res: PixelRect,
}

impl TileRegion {
    /// Size of the encoded tile: the clamped local width and height.
    pub fn output_size(&self) -> (u32, u32) {
        self.local.size()
    }
}

/// Maps tile addresses onto a [`PyramidDescriptor`].
#[derive(Debug, Clone, Copy)]
pub struct TileAddressor<'a> {
    pyramid: &'a PyramidDescriptor,
}

impl<'a> TileAddressor<'a> {
    pub fn new(pyramid: &'a PyramidDescriptor) -> Self {
        Self { pyramid }
    }

    pub fn pyramid(&self) -> &PyramidDescriptor {
        self.pyramid
    }

    /// Compute the rectangles for a tile.
    ///
    /// # Errors
    ///
    /// `InvalidLevel` when `level` is outside the pyramid and `TileOutOfBounds`
    /// when `(col, row)` is outside the level's grid.
    pub fn tile(&self, level: u32, col: u32, row: u32) -> Result<TileRegion, TileError> {
        let level_count = self.pyramid.level_count();
        let invalid_level = || TileError::InvalidLevel { level, level_count };

        let (width, height) = self.pyramid.level_dimensions(level).ok_or_else(invalid_level)?;
        let (cols, rows) = self.pyramid.tile_grid(level).ok_or_else(invalid_level)?;
        let downsample = self.pyramid.downsample(level).ok_or_else(invalid_level)?;

        if col >= cols || row >= rows {
            return Err(TileError::TileOutOfBounds {
                level,
                col,
                row,
                cols,
                rows,
            });
        }

        let tile_size = self.pyramid.tile_size();
        let overlap = self.pyramid.overlap();

        let (x0, x1) = tile_span(col, tile_size, overlap, width);
        let (y0, y1) = tile_span(row, tile_size, overlap, height);
        let (ix0, ix1) = tile_span(col, tile_size, 0, width);
        let (iy0, iy1) = tile_span(row, tile_size, 0, height);

        let (base_width, base_height) = self.pyramid.dimensions();
        let (origin_x, origin_y) = self.pyramid.origin();
        let full_res = PixelRect::new(
            to_full_res(x0, downsample, base_width),
            to_full_res(y0, downsample, base_height),
            to_full_res(x1, downsample, base_width),
            to_full_res(y1, downsample, base_height),
        )
        .offset(origin_x, origin_y);

        Ok(TileRegion {
            level,
            col,
            row,
            downsample,
            local: PixelRect::new(x0, y0, x1, y1),
            interior: PixelRect::new(ix0, iy0, ix1, iy1),
            full_res,
        })
    }

    /// Address a tile and read its pixels from `image`.
    ///
    /// The returned image is exactly [`TileRegion::output_size`]. Read
    /// failures surface as `TileError::Io` and are not retried.
    pub fn read_tile<I>(
        &self,
        image: &I,
        level: u32,
        col: u32,
        row: u32,
    ) -> Result<(TileRegion, RgbImage), TileError>
    where
        I: ImageSource + ?Sized,
    {
        let region = self.tile(level, col, row)?;
        let pixels =
            image.read_region(region.full_res.origin(), region.downsample, region.output_size())?;
        Ok((region, pixels))
    }
}

/// Level-local span of tile `index` along one axis.
///
/// Both ends derive from the unclamped start `index * tile_size - overlap`,
/// then the start is clamped at 0 and the end at `extent`.
fn tile_span(index: u32, tile_size: u32, overlap: u32, extent: u32) -> (u32, u32) {
    let start = u64::from(index) * u64::from(tile_size);
    let lo = start.saturating_sub(u64::from(overlap));
    let hi = (start + u64::from(tile_size) + u64::from(overlap)).min(u64::from(extent));
    (lo as u32, hi as u32)
}

/// Scale a level-local coordinate to full resolution, capped at the base extent.
fn to_full_res(coord: u32, downsample: u32, extent: u32) -> u32 {
    (u64::from(coord) * u64::from(downsample)).min(u64::from(extent)) as u32
}

// =============================================================================
// Tests
// =============================================================================
