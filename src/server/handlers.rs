//! HTTP request handlers for the Deep Zoom tile API.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /slides` - List slides
//! - `GET /slides/{slide_id}` - Pyramid manifest (JSON)
//! - `GET /slides/{slide_id}/dzi` - Deep Zoom manifest (XML)
//! - `GET /slides/{slide_id}/dzi_files/{level}/{col}_{row}.jpeg` - Deep Zoom tile
//! - `GET /tiles/{slide_id}/{level}/{col}/{row}.jpg` - Tile
//! - `GET /slides/{slide_id}/region?x=&y=&width=&height=` - Arbitrary region

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{IoError, TileError};
use crate::geometry::PixelRect;
use crate::pyramid::LevelInfo;
use crate::region::{TargetWindow, ViewportRect};
use crate::slide::SlideSource;
use crate::tile::{RegionRequest, TileRequest, TileService, DEFAULT_JPEG_QUALITY};

use super::dzi::{parse_dzi_tile_coords, pyramid_dzi_xml};

const TILE_CACHE_HIT: HeaderName = HeaderName::from_static("x-tile-cache-hit");
const TILE_QUALITY: HeaderName = HeaderName::from_static("x-tile-quality");
const REGION_CROP: HeaderName = HeaderName::from_static("x-region-crop");
const REGION_SIZE: HeaderName = HeaderName::from_static("x-region-size");
const VIEW_CENTER_X: HeaderName = HeaderName::from_static("x-view-center-x");
const VIEW_CENTER_Y: HeaderName = HeaderName::from_static("x-view-center-y");
const VIEW_ZOOM: HeaderName = HeaderName::from_static("x-view-zoom");

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the tile service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: SlideSource> {
    pub tile_service: Arc<TileService<S>>,

    /// Cache-Control max-age in seconds (defaults to 1 hour)
    pub cache_max_age: u32,

    /// JPEG quality used when a request does not ask for one
    pub default_quality: u8,
}

impl<S: SlideSource> AppState<S> {
    pub fn new(tile_service: TileService<S>) -> Self {
        Self::with_cache_max_age(tile_service, 3600)
    }

    pub fn with_cache_max_age(tile_service: TileService<S>, cache_max_age: u32) -> Self {
        Self {
            tile_service: Arc::new(tile_service),
            cache_max_age,
            default_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_default_quality(mut self, quality: u8) -> Self {
        self.default_quality = quality;
        self
    }

    fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }
}

impl<S: SlideSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            tile_service: Arc::clone(&self.tile_service),
            cache_max_age: self.cache_max_age,
            default_quality: self.default_quality,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for direct tile requests.
///
/// Extracted from: `/tiles/{slide_id}/{level}/{col}/{filename}`
/// where filename is `{row}` or `{row}.jpg`
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    pub slide_id: String,

    /// Pyramid level (0 = coarsest)
    pub level: u32,

    pub col: u32,

    /// Tile row with optional extension (e.g., "0" or "0.jpg")
    pub filename: String,
}

impl TilePathParams {
    /// Parse the row from the filename, stripping any .jpg or .jpeg extension.
    pub fn row(&self) -> Option<u32> {
        let row = self
            .filename
            .strip_suffix(".jpg")
            .or_else(|| self.filename.strip_suffix(".jpeg"))
            .unwrap_or(&self.filename);
        row.parse().ok()
    }
}

/// Path parameters for Deep Zoom tile requests.
///
/// Extracted from: `/slides/{slide_id}/dzi_files/{level}/{filename}`
/// where filename is `{col}_{row}.jpeg`
#[derive(Debug, Deserialize)]
pub struct DziTilePathParams {
    pub slide_id: String,
    pub level: u32,
    pub filename: String,
}

/// Query parameters for tile requests.
#[derive(Debug, Deserialize)]
pub struct TileQueryParams {
    /// JPEG quality (1-100, defaults to the server setting)
    #[serde(default)]
    pub quality: Option<u8>,
}

/// Query parameters for region requests.
///
/// The rectangle fields are required; the target fields come as a pair.
#[derive(Debug, Deserialize)]
pub struct RegionQueryParams {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,

    #[serde(default)]
    pub target_w: Option<i64>,

    #[serde(default)]
    pub target_h: Option<i64>,

    #[serde(default)]
    pub quality: Option<u8>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_argument")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response from the slides list endpoint.
#[derive(Debug, Serialize)]
pub struct SlidesResponse {
    pub slides: Vec<String>,
}

/// Bounding rectangle of the pyramid in raw image pixels.
#[derive(Debug, Serialize)]
pub struct BoundsResponse {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl From<PixelRect> for BoundsResponse {
    fn from(rect: PixelRect) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

/// Response from the slide manifest endpoint.
#[derive(Debug, Serialize)]
pub struct SlideMetadataResponse {
    pub slide_id: String,

    /// Width of the pyramid base (bounds applied) in pixels
    pub width: u32,

    /// Height of the pyramid base (bounds applied) in pixels
    pub height: u32,

    pub tile_size: u32,
    pub overlap: u32,
    pub level_count: u32,

    /// Level count under Deep Zoom numbering, as used by `dzi_files` paths
    pub deep_zoom_level_count: u32,

    pub limit_bounds: bool,
    pub bounds: BoundsResponse,

    /// Every level, coarsest first
    pub levels: Vec<LevelInfo>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert TileError to HTTP response.
///
/// Errors are logged by severity:
/// - 5xx at ERROR
/// - 404 at DEBUG (common and expected)
/// - other 4xx at WARN
impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            TileError::SlideNotFound { .. } | TileError::Io(IoError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            TileError::InvalidLevel { .. } | TileError::TileOutOfBounds { .. } => {
                (StatusCode::NOT_FOUND, "tile_not_found")
            }
            TileError::InvalidArgument { .. } => (StatusCode::BAD_REQUEST, "invalid_argument"),
            TileError::InvalidQuality { .. } => (StatusCode::BAD_REQUEST, "invalid_quality"),
            TileError::Config(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_slide"),
            TileError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            TileError::EncodeError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

/// Wrapper for handler errors to implement IntoResponse.
pub struct HandlerError(pub TileError);

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

impl From<TileError> for HandlerError {
    fn from(err: TileError) -> Self {
        HandlerError(err)
    }
}

impl From<QueryRejection> for HandlerError {
    fn from(rejection: QueryRejection) -> Self {
        HandlerError(TileError::InvalidArgument {
            message: rejection.body_text(),
        })
    }
}

impl From<PathRejection> for HandlerError {
    fn from(rejection: PathRejection) -> Self {
        HandlerError(TileError::InvalidArgument {
            message: rejection.body_text(),
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// `GET /health` returns `{"status": "healthy", "version": "0.1.0"}`.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle slides list requests.
///
/// `GET /slides` returns `{"slides": ["a.jpg", "b.png"]}`, sorted.
pub async fn slides_handler<S: SlideSource>(
    State(state): State<AppState<S>>,
) -> Result<Json<SlidesResponse>, HandlerError> {
    let result = state.tile_service.list_slides().await?;
    Ok(Json(SlidesResponse {
        slides: result.slides,
    }))
}

/// Handle slide manifest requests.
///
/// # Endpoint
///
/// `GET /slides/{slide_id}`
///
/// # Response
///
/// ```json
/// {
///   "slide_id": "sample.jpg",
///   "width": 1000,
///   "height": 800,
///   "tile_size": 256,
///   "overlap": 0,
///   "level_count": 10,
///   "deep_zoom_level_count": 11,
///   "limit_bounds": true,
///   "bounds": { "x": 0, "y": 0, "width": 1000, "height": 800 },
///   "levels": [
///     { "level": 0, "width": 2, "height": 2, "tiles_x": 1, "tiles_y": 1, "downsample": 512 }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Slide not found
/// - `422 Unprocessable Entity`: Slide geometry cannot form a pyramid
/// - `500 Internal Server Error`: Read or decode failure
pub async fn slide_metadata_handler<S: SlideSource>(
    State(state): State<AppState<S>>,
    Path(slide_id): Path<String>,
) -> Result<Json<SlideMetadataResponse>, HandlerError> {
    let pyramid = state.tile_service.manifest(&slide_id).await?;
    let (width, height) = pyramid.dimensions();
    let config = pyramid.config();

    Ok(Json(SlideMetadataResponse {
        slide_id,
        width,
        height,
        tile_size: config.tile_size,
        overlap: config.overlap,
        level_count: pyramid.level_count(),
        deep_zoom_level_count: pyramid.deep_zoom_level_count(),
        limit_bounds: config.limit_bounds,
        bounds: pyramid.bounds().into(),
        levels: pyramid.levels(),
    }))
}

/// Handle DZI descriptor requests.
///
/// `GET /slides/{slide_id}/dzi` returns the Deep Zoom XML manifest. Viewers
/// derive tile URLs from it as `dzi_files/{level}/{col}_{row}.jpeg`.
pub async fn dzi_descriptor_handler<S: SlideSource>(
    State(state): State<AppState<S>>,
    Path(slide_id): Path<String>,
) -> Result<Response, HandlerError> {
    let pyramid = state.tile_service.manifest(&slide_id).await?;
    let xml = pyramid_dzi_xml(&pyramid);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/xml".to_string()),
            (header::CACHE_CONTROL, state.cache_control()),
        ],
        xml,
    )
        .into_response())
}

/// Handle Deep Zoom tile requests.
///
/// # Endpoint
///
/// `GET /slides/{slide_id}/dzi_files/{level}/{col}_{row}.jpeg`
///
/// The extension may be `.jpeg`, `.jpg` or omitted. Levels follow Deep Zoom
/// numbering (full resolution is `ceil(log2(max(width, height)))`), which is
/// what viewers derive from the manifest; they are translated to pyramid
/// levels before addressing.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed file name or quality
/// - `404 Not Found`: Slide, level or tile does not exist
pub async fn dzi_tile_handler<S: SlideSource>(
    State(state): State<AppState<S>>,
    params: Result<Path<DziTilePathParams>, PathRejection>,
    query: Result<Query<TileQueryParams>, QueryRejection>,
) -> Result<Response, HandlerError> {
    let Path(params) = params?;
    let Query(query) = query?;

    let (col, row) =
        parse_dzi_tile_coords(&params.filename).ok_or_else(|| TileError::InvalidArgument {
            message: format!("Invalid tile file name: {}", params.filename),
        })?;

    let request = TileRequest::new(params.slide_id, params.level, col, row).deep_zoom();
    serve_tile(&state, request, query.quality).await
}

/// Handle direct tile requests.
///
/// # Endpoint
///
/// `GET /tiles/{slide_id}/{level}/{col}/{row}.jpg`
///
/// # Query Parameters
///
/// - `quality`: JPEG quality 1-100 (default: server setting)
///
/// # Response
///
/// - `200 OK`: JPEG tile image with `Content-Type: image/jpeg`
/// - `400 Bad Request`: Malformed path or quality
/// - `404 Not Found`: Slide, level or tile does not exist
/// - `500 Internal Server Error`: Read or encode failure
///
/// # Headers
///
/// - `Content-Type: image/jpeg`
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `X-Tile-Cache-Hit: true|false`
/// - `X-Tile-Quality: {quality}`
pub async fn tile_handler<S: SlideSource>(
    State(state): State<AppState<S>>,
    params: Result<Path<TilePathParams>, PathRejection>,
    query: Result<Query<TileQueryParams>, QueryRejection>,
) -> Result<Response, HandlerError> {
    let Path(params) = params?;
    let Query(query) = query?;

    let row = params.row().ok_or_else(|| TileError::InvalidArgument {
        message: format!("Invalid tile row: {}", params.filename),
    })?;

    let request = TileRequest::new(params.slide_id, params.level, params.col, row);
    serve_tile(&state, request, query.quality).await
}

async fn serve_tile<S: SlideSource>(
    state: &AppState<S>,
    mut request: TileRequest,
    quality: Option<u8>,
) -> Result<Response, HandlerError> {
    request.quality = quality.unwrap_or(state.default_quality);

    let response = state.tile_service.get_tile(request).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CACHE_CONTROL, state.cache_control()),
            (TILE_CACHE_HIT, response.cache_hit.to_string()),
            (TILE_QUALITY, response.quality.to_string()),
        ],
        response.data,
    )
        .into_response())
}

/// Handle region requests.
///
/// # Endpoint
///
/// `GET /slides/{slide_id}/region?x=&y=&width=&height=[&target_w=&target_h=][&quality=]`
///
/// The rectangle is in full-resolution pixels and is clamped to the image;
/// it is never rejected for lying outside. With a target the output is
/// fitted inside `target_w x target_h`, preserving aspect ratio.
///
/// # Headers
///
/// - `X-Region-Crop: x0,y0,x1,y1` (clamped crop)
/// - `X-Region-Size: WxH` (encoded image size)
/// - `X-View-Center-X`, `X-View-Center-Y`, `X-View-Zoom` (view summary)
///
/// # Errors
///
/// - `400 Bad Request`: Missing or non-numeric rectangle fields, a lone
///   target field, an output beyond the region size limits, or a bad quality
/// - `404 Not Found`: Slide not found
/// - `500 Internal Server Error`: Read or encode failure
pub async fn region_handler<S: SlideSource>(
    State(state): State<AppState<S>>,
    Path(slide_id): Path<String>,
    query: Result<Query<RegionQueryParams>, QueryRejection>,
) -> Result<Response, HandlerError> {
    let Query(query) = query?;

    let mut request = RegionRequest::new(
        slide_id,
        ViewportRect::new(query.x, query.y, query.width, query.height),
    )
    .with_quality(query.quality.unwrap_or(state.default_quality));

    if let Some(target) = TargetWindow::from_parts(query.target_w, query.target_h)? {
        request = request.with_target(target);
    }

    let response = state.tile_service.get_region(request).await?;
    let crop = response.crop.local;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CACHE_CONTROL, state.cache_control()),
            (
                REGION_CROP,
                format!("{},{},{},{}", crop.x0, crop.y0, crop.x1, crop.y1),
            ),
            (
                REGION_SIZE,
                format!("{}x{}", response.size.0, response.size.1),
            ),
            (VIEW_CENTER_X, format!("{:.6}", response.summary.center_x)),
            (VIEW_CENTER_Y, format!("{:.6}", response.summary.center_y)),
            (VIEW_ZOOM, format!("{:.6}", response.summary.zoom)),
        ],
        response.data,
    )
        .into_response())
}

// =============================================================================
// Tests
// =============================================================================
