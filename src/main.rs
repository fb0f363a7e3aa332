//! WSI Deep Zoom - a Deep Zoom tile and region server for large images.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsi_deepzoom::{
    config::Config,
    server::{create_router, RouterConfig},
    slide::{LocalSlideSource, SlideSource},
    tile::TileService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let pyramid = config.pyramid_config();

    info!("WSI Deep Zoom v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Slides directory: {}", config.slides_dir.display());
    info!(
        "  Tiles: {}px, overlap {}px, limit bounds {}",
        pyramid.tile_size, pyramid.overlap, pyramid.limit_bounds
    );
    info!("  JPEG quality: {}", config.jpeg_quality);
    info!(
        "  Region limits: {}px per side, {} pixels",
        config.max_region_side, config.max_region_pixels
    );
    if config.cache_tiles > 0 {
        info!("  Tile cache: {}KB", config.cache_tiles / 1024);
    } else {
        info!("  Tile cache: disabled");
    }

    let source = LocalSlideSource::new(&config.slides_dir);

    match source.list_slides().await {
        Ok(result) if result.slides.is_empty() => {
            warn!("  No slides found in {}", source.root().display());
        }
        Ok(result) => {
            info!("  Found {} slide(s)", result.slides.len());
        }
        Err(e) => {
            error!("Cannot read slides directory {}: {}", source.root().display(), e);
            return ExitCode::FAILURE;
        }
    }

    let tile_service = match TileService::new(source, pyramid) {
        Ok(service) => service
            .with_cache_capacity(config.cache_tiles)
            .with_region_limits(config.region_limits()),
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let router = create_router(tile_service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/slides", addr);
    info!("    curl http://{}/slides/<slide_id>/dzi", addr);
    info!(
        "    curl 'http://{}/slides/<slide_id>/region?x=0&y=0&width=512&height=512'",
        addr
    );
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "wsi_deepzoom=debug,tower_http=debug"
    } else {
        "wsi_deepzoom=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the command line configuration.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_default_quality(config.jpeg_quality)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
