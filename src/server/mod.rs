//! HTTP server layer.
//!
//! A thin axum surface over the tile service; the pyramid and region engine
//! does not depend on it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   /slides/{id}/dzi  /slides/{id}/dzi_files/..  /slides/{id}/region │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │     dzi     │  │        routes           │  │
//! │  │ (requests)  │  │ (manifest)  │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod dzi;
pub mod handlers;
pub mod routes;

pub use dzi::{generate_dzi_xml, parse_dzi_tile_coords, pyramid_dzi_xml, DZI_FORMAT};
pub use handlers::{
    dzi_descriptor_handler, dzi_tile_handler, health_handler, region_handler,
    slide_metadata_handler, slides_handler, tile_handler, AppState, BoundsResponse,
    DziTilePathParams, ErrorResponse, HandlerError, HealthResponse, RegionQueryParams,
    SlideMetadataResponse, SlidesResponse, TilePathParams, TileQueryParams,
};
pub use routes::{create_router, RouterConfig};
