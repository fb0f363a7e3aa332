//! Deep Zoom pyramid geometry.
//!
//! A pyramid is a sequence of progressively halved copies of the image. Levels
//! are numbered Deep Zoom style:
//!
//! ```text
//! level 0            coarsest, one or two pixels on the long side
//! level 1            twice the resolution of level 0
//! ...
//! level N-1          full resolution (downsample 1)
//! ```
//!
//! # Components
//!
//! - [`PyramidConfig`]: immutable tile size / overlap / bounds settings
//! - [`PyramidDescriptor`]: level count, per-level dimensions and tile grids
//! - [`LevelScheme`]: Deep Zoom clients number full resolution
//!   `ceil(log2(max(W, H)))`, one above this pyramid for non power-of-two
//!   sizes; [`PyramidDescriptor::resolve_level`] translates
//! - [`TileAddressor`]: maps `(level, col, row)` to exact pixel rectangles
//!   and reads the tile from an [`ImageSource`](crate::slide::ImageSource)
//!
//! # Example
//!
//! ```
//! use wsi_deepzoom::pyramid::{PyramidConfig, PyramidDescriptor, TileAddressor};
//!
//! let config = PyramidConfig::new(256, 0, false);
//! let pyramid = PyramidDescriptor::new(1000, 800, config).unwrap();
//! assert_eq!(pyramid.level_count(), 10);
//!
//! let tile = TileAddressor::new(&pyramid).tile(9, 3, 3).unwrap();
//! assert_eq!(tile.output_size(), (232, 32));
//! ```

mod addressor;
mod descriptor;

pub use addressor::{TileAddressor, TileRegion};
pub use descriptor::{
    deep_zoom_max_level, level_count_for, LevelInfo, LevelScheme, PyramidConfig,
    PyramidDescriptor, DEFAULT_OVERLAP, DEFAULT_TILE_SIZE,
};
