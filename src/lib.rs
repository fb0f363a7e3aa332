//! # WSI Deep Zoom
//!
//! A Deep Zoom tile and region server for arbitrarily large images such as
//! microscopy slides.
//!
//! Images are served two ways:
//!
//! - as a standard tiled pyramid that a Deep Zoom client streams level by
//!   level, and
//! - as arbitrary rectangles cut at full resolution and resampled to fit a
//!   caller's display.
//!
//! ## Architecture
//!
//! - [`pyramid`] - level count, level dimensions, tile grids and exact tile
//!   rectangles (overlap and edge truncation included)
//! - [`region`] - viewport clamping, aspect-preserving resampling and view
//!   summaries
//! - [`slide`] - the image source capability and its implementations
//! - [`tile`] - tile service, JPEG encoding and the optional tile cache
//! - [`server`] - Axum-based HTTP routes and the Deep Zoom manifest
//! - [`config`] - CLI and environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use wsi_deepzoom::{create_router, LocalSlideSource, PyramidConfig, RouterConfig, TileService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = LocalSlideSource::new("./slides");
//!     let service = TileService::new(source, PyramidConfig::default()).unwrap();
//!     let router = create_router(service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod pyramid;
pub mod region;
pub mod server;
pub mod slide;
pub mod tile;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, IoError, TileError};
pub use geometry::PixelRect;
pub use pyramid::{LevelInfo, PyramidConfig, PyramidDescriptor, TileAddressor, TileRegion};
pub use region::{
    fit_within, ExtractedRegion, OutputLimits, RegionCrop, RegionExtractor, TargetWindow,
    ViewSummary, ViewportRect, DEFAULT_MAX_OUTPUT_PIXELS, DEFAULT_MAX_OUTPUT_SIDE,
};
pub use server::{create_router, AppState, ErrorResponse, RouterConfig};
pub use slide::{ImageSource, InMemoryImage, LocalSlideSource, SlideListResult, SlideSource};
pub use tile::{
    JpegTileEncoder, RegionRequest, RegionResponse, TileCache, TileCacheKey, TileRequest,
    TileResponse, TileService, DEFAULT_JPEG_QUALITY,
};
