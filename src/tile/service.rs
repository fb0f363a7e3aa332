//! Tile Service for orchestrating tile and region generation.
//!
//! The TileService is the main entry point for image requests. It
//! orchestrates:
//! - Request validation
//! - Optional cache lookups (tiles only)
//! - Slide access, one handle per request
//! - Pyramid addressing or region extraction
//! - JPEG encoding
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         TileService                             │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │            get_tile()            get_region()           │    │
//! │  │  1. Validate quality      1. Validate quality           │    │
//! │  │  2. Check cache           2. Open slide                 │    │
//! │  │  3. Open slide            3. Clamp, read, resample      │    │
//! │  │  4. Address + read        4. Encode                     │    │
//! │  │  5. Encode, cache                                       │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │           │
//! │           ▼                    ▼                    ▼           │
//! │    ┌───────────┐      ┌──────────────┐    ┌──────────────────┐  │
//! │    │ TileCache │      │ SlideSource  │    │ JpegTileEncoder  │  │
//! │    │ (opt-in)  │      └──────────────┘    └──────────────────┘  │
//! │    └───────────┘                                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::error::{ConfigError, IoError, TileError};
use crate::pyramid::{LevelScheme, PyramidConfig, PyramidDescriptor, TileAddressor};
use crate::region::{
    OutputLimits, RegionCrop, RegionExtractor, TargetWindow, ViewSummary, ViewportRect,
};
use crate::slide::{ImageSource, SlideListResult, SlideSource};

use super::cache::{TileCache, TileCacheKey};
use super::encoder::{is_valid_quality, JpegTileEncoder, DEFAULT_JPEG_QUALITY};

// =============================================================================
// Requests and Responses
// =============================================================================

/// A request for a tile.
#[derive(Debug, Clone)]
pub struct TileRequest {
    pub slide_id: String,

    /// Level, numbered per `scheme` (0 = coarsest)
    pub level: u32,

    /// Tile column (0-indexed from left)
    pub col: u32,

    /// Tile row (0-indexed from top)
    pub row: u32,

    /// JPEG quality (1-100, defaults to 80)
    pub quality: u8,

    pub scheme: LevelScheme,
}

impl TileRequest {
    /// Create a new tile request with default quality.
    pub fn new(slide_id: impl Into<String>, level: u32, col: u32, row: u32) -> Self {
        Self::with_quality(slide_id, level, col, row, DEFAULT_JPEG_QUALITY)
    }

    pub fn with_quality(
        slide_id: impl Into<String>,
        level: u32,
        col: u32,
        row: u32,
        quality: u8,
    ) -> Self {
        Self {
            slide_id: slide_id.into(),
            level,
            col,
            row,
            quality,
            scheme: LevelScheme::Pyramid,
        }
    }

    /// Number `level` Deep Zoom style, as `dzi_files` paths do.
    pub fn deep_zoom(mut self) -> Self {
        self.scheme = LevelScheme::DeepZoom;
        self
    }
}

/// Response from the tile service.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// The encoded JPEG tile data
    pub data: Bytes,

    /// Whether this tile was served from cache
    pub cache_hit: bool,

    /// The JPEG quality used for encoding
    pub quality: u8,
}

/// A request for an arbitrary region.
#[derive(Debug, Clone)]
pub struct RegionRequest {
    pub slide_id: String,
    pub rect: ViewportRect,
    pub target: Option<TargetWindow>,
    pub quality: u8,
}

impl RegionRequest {
    pub fn new(slide_id: impl Into<String>, rect: ViewportRect) -> Self {
        Self {
            slide_id: slide_id.into(),
            rect,
            target: None,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_target(mut self, target: TargetWindow) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }
}

/// Encoded region plus the geometry that produced it.
#[derive(Debug, Clone)]
pub struct RegionResponse {
    pub data: Bytes,
    pub crop: RegionCrop,

    /// Output size of the encoded image
    pub size: (u32, u32),

    pub summary: ViewSummary,
    pub quality: u8,
}

// =============================================================================
// Tile Service
// =============================================================================

/// Service for generating tiles and regions.
///
/// # Type Parameters
///
/// * `S` - The slide source type
///
/// # Example
///
/// ```ignore
/// use wsi_deepzoom::pyramid::PyramidConfig;
/// use wsi_deepzoom::slide::LocalSlideSource;
/// use wsi_deepzoom::tile::{TileRequest, TileService};
///
/// let service = TileService::new(LocalSlideSource::new("./slides"), PyramidConfig::default())?;
///
/// let response = service.get_tile(TileRequest::new("sample.jpg", 9, 3, 3)).await?;
/// println!("Tile size: {} bytes", response.data.len());
/// ```
pub struct TileService<S: SlideSource> {
    source: Arc<S>,

    /// Geometry settings shared by every pyramid this service builds
    config: PyramidConfig,

    /// Encoded tile cache; `None` keeps the service cache-free
    cache: Option<TileCache>,

    /// Largest region output accepted
    region_limits: OutputLimits,

    encoder: JpegTileEncoder,
}

impl<S: SlideSource> TileService<S> {
    /// Create a cache-free service.
    ///
    /// # Errors
    ///
    /// Rejects an invalid tile size or overlap.
    pub fn new(source: S, config: PyramidConfig) -> Result<Self, ConfigError> {
        Self::with_shared_source(Arc::new(source), config)
    }

    /// Create a service over a source shared with other components.
    pub fn with_shared_source(source: Arc<S>, config: PyramidConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            cache: None,
            region_limits: OutputLimits::default(),
            encoder: JpegTileEncoder::new(),
        })
    }

    /// Enable the tile cache with the given capacity in bytes.
    ///
    /// A capacity of 0 disables caching.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then(|| TileCache::with_capacity(capacity));
        self
    }

    /// Bound the size of region outputs.
    pub fn with_region_limits(mut self, limits: OutputLimits) -> Self {
        self.region_limits = limits;
        self
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn region_limits(&self) -> OutputLimits {
        self.region_limits
    }

    pub fn config(&self) -> PyramidConfig {
        self.config
    }

    /// List the slides available from the source.
    pub async fn list_slides(&self) -> Result<SlideListResult, TileError> {
        Ok(self.source.list_slides().await?)
    }

    /// Describe the pyramid of a slide.
    pub async fn manifest(&self, slide_id: &str) -> Result<PyramidDescriptor, TileError> {
        let image = self.open(slide_id).await?;
        self.descriptor(&image)
    }

    /// Get a tile, using the cache when enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The quality is outside 1-100
    /// - The slide cannot be found or opened
    /// - The level or tile coordinates are outside the pyramid
    /// - The pixels cannot be read or encoded
    pub async fn get_tile(&self, request: TileRequest) -> Result<TileResponse, TileError> {
        let quality = validate_quality(request.quality)?;

        let Some(cache) = &self.cache else {
            let data = self.generate_tile(&request).await?;
            return Ok(TileResponse {
                data,
                cache_hit: false,
                quality,
            });
        };

        let cache_key = TileCacheKey::new(
            request.slide_id.as_str(),
            request.level,
            request.col,
            request.row,
            quality,
        )
        .with_scheme(request.scheme);

        if let Some(data) = cache.get(&cache_key).await {
            return Ok(TileResponse {
                data,
                cache_hit: true,
                quality,
            });
        }

        let data = self.generate_tile(&request).await?;
        cache.put(cache_key, data.clone()).await;

        Ok(TileResponse {
            data,
            cache_hit: false,
            quality,
        })
    }

    /// Generate a tile, bypassing the cache.
    pub async fn generate_tile(&self, request: &TileRequest) -> Result<Bytes, TileError> {
        let image = self.open(&request.slide_id).await?;
        let pyramid = self.descriptor(&image)?;

        let level = pyramid.resolve_level(request.level, request.scheme)?;

        let (tile, pixels) =
            TileAddressor::new(&pyramid).read_tile(&image, level, request.col, request.row)?;
        drop(image);

        debug!(
            slide_id = %request.slide_id,
            level = level,
            col = request.col,
            row = request.row,
            width = tile.local.width(),
            height = tile.local.height(),
            "Generated tile"
        );

        self.encoder.encode(&pixels, request.quality)
    }

    /// Extract, resample and encode a region.
    ///
    /// Rectangles outside the image are clamped, never rejected.
    pub async fn get_region(&self, request: RegionRequest) -> Result<RegionResponse, TileError> {
        let quality = validate_quality(request.quality)?;

        let image = self.open(&request.slide_id).await?;
        let extractor =
            RegionExtractor::new(&image, self.config.limit_bounds)?.with_limits(self.region_limits);
        let region = extractor.extract(&image, request.rect, request.target)?;
        drop(image);

        debug!(
            slide_id = %request.slide_id,
            crop_width = region.crop.local.width(),
            crop_height = region.crop.local.height(),
            out_width = region.size.0,
            out_height = region.size.1,
            "Extracted region"
        );

        let data = self.encoder.encode(&region.image, quality)?;
        Ok(RegionResponse {
            data,
            crop: region.crop,
            size: region.size,
            summary: region.summary,
            quality,
        })
    }

    /// Cache statistics `(current_size, capacity, entry_count)`, if enabled.
    pub async fn cache_stats(&self) -> Option<(usize, usize, usize)> {
        let cache = self.cache.as_ref()?;
        Some((cache.size().await, cache.capacity(), cache.len().await))
    }

    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear().await;
        }
    }

    async fn open(&self, slide_id: &str) -> Result<S::Image, TileError> {
        self.source.open(slide_id).await.map_err(|e| match e {
            IoError::NotFound(_) => TileError::SlideNotFound {
                slide_id: slide_id.to_string(),
            },
            other => TileError::Io(other),
        })
    }

    fn descriptor(&self, image: &S::Image) -> Result<PyramidDescriptor, TileError> {
        let (width, height) = image.dimensions();
        Ok(PyramidDescriptor::with_bounds(
            width,
            height,
            image.bounding_box(),
            self.config,
        )?)
    }
}

fn validate_quality(quality: u8) -> Result<u8, TileError> {
    if is_valid_quality(quality) {
        Ok(quality)
    } else {
        Err(TileError::InvalidQuality { quality })
    }
}

// =============================================================================
// Tests
// =============================================================================
