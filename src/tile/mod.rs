//! Tile service layer.
//!
//! This module turns pyramid addresses and region requests into encoded JPEG
//! bytes for the HTTP layer.
//!
//! # Architecture
//!
//! The tile service sits between the HTTP layer and the slide abstraction:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileCache   │  │  JPEG Encoder   │  │
//! │  │  (optional,  │  │  (pixels →      │  │
//! │  │   encoded)   │  │   JPEG)         │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │     SlideSource → pyramid / region      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileService`]: orchestrates tile, region and manifest requests
//! - [`TileCache`]: opt-in LRU cache for encoded tiles with size-based eviction
//! - [`TileCacheKey`]: slide, level, column, row and quality
//! - [`JpegTileEncoder`]: encodes pixels at the requested quality
//! - [`TileRequest`] / [`TileResponse`], [`RegionRequest`] / [`RegionResponse`]

mod cache;
mod encoder;
mod service;

pub use cache::{TileCache, TileCacheKey};
pub use encoder::{
    clamp_quality, is_valid_quality, JpegTileEncoder, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY,
    MIN_JPEG_QUALITY,
};
pub use service::{RegionRequest, RegionResponse, TileRequest, TileResponse, TileService};
