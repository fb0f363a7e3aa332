//! Router configuration.
//!
//! # Route Structure
//!
//! ```text
//! /health                                          - Health check
//! /slides                                          - List slides
//! /slides/{slide_id}                               - Pyramid manifest (JSON)
//! /slides/{slide_id}/dzi                           - Deep Zoom manifest (XML)
//! /slides/{slide_id}/dzi_files/{level}/{col}_{row}.jpeg
//! /slides/{slide_id}/region?x=&y=&width=&height=   - Region extraction
//! /tiles/{slide_id}/{level}/{col}/{row}.jpg        - Tile
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wsi_deepzoom::pyramid::PyramidConfig;
//! use wsi_deepzoom::server::{create_router, RouterConfig};
//! use wsi_deepzoom::slide::LocalSlideSource;
//! use wsi_deepzoom::tile::TileService;
//!
//! let tile_service = TileService::new(LocalSlideSource::new("./slides"), PyramidConfig::default())?;
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(tile_service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    dzi_descriptor_handler, dzi_tile_handler, health_handler, region_handler,
    slide_metadata_handler, slides_handler, tile_handler, AppState,
};
use crate::slide::SlideSource;
use crate::tile::{TileService, DEFAULT_JPEG_QUALITY};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// JPEG quality for requests that do not specify one
    pub default_quality: u8,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Default JPEG quality is 80
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: 3600,
            default_quality: DEFAULT_JPEG_QUALITY,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    pub fn with_default_quality(mut self, quality: u8) -> Self {
        self.default_quality = quality;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// Tile paths use a `{filename}` segment to accept both `{row}` and
/// `{row}.jpg` (and `{col}_{row}.jpeg` for Deep Zoom paths).
pub fn create_router<S>(tile_service: TileService<S>, config: RouterConfig) -> Router
where
    S: SlideSource + 'static,
{
    let app_state = AppState::with_cache_max_age(tile_service, config.cache_max_age)
        .with_default_quality(config.default_quality);

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/slides", get(slides_handler::<S>))
        .route("/slides/{slide_id}", get(slide_metadata_handler::<S>))
        .route("/slides/{slide_id}/dzi", get(dzi_descriptor_handler::<S>))
        .route(
            "/slides/{slide_id}/dzi_files/{level}/{filename}",
            get(dzi_tile_handler::<S>),
        )
        .route("/slides/{slide_id}/region", get(region_handler::<S>))
        .route(
            "/tiles/{slide_id}/{level}/{col}/{filename}",
            get(tile_handler::<S>),
        )
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
