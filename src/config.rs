//! Configuration management.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `WSI_` prefix
//! - Defaults for every setting
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use wsi_deepzoom::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//!
//! println!("Listening on {}", config.bind_address());
//! let pyramid = config.pyramid_config();
//! ```
//!
//! # Environment Variables
//!
//! - `WSI_HOST` - Server bind address (default: 0.0.0.0)
//! - `WSI_PORT` - Server port (default: 3000)
//! - `WSI_SLIDES_DIR` - Directory holding slide images (default: ./slides)
//! - `WSI_TILE_SIZE` - Tile edge in pixels (default: 256)
//! - `WSI_OVERLAP` - Tile overlap in pixels (default: 0)
//! - `WSI_LIMIT_BOUNDS` - Honour source bounding boxes (default: true)
//! - `WSI_JPEG_QUALITY` - Default JPEG quality (default: 80)
//! - `WSI_CACHE_TILES` - Tile cache capacity in bytes, 0 disables (default: 0)
//! - `WSI_MAX_REGION_SIDE` - Longest region output side (default: 65535)
//! - `WSI_MAX_REGION_PIXELS` - Region output pixel budget (default: 67108864)
//! - `WSI_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `WSI_CORS_ORIGINS` - Comma separated allowed origins (default: any)

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::pyramid::{PyramidConfig, DEFAULT_OVERLAP, DEFAULT_TILE_SIZE};
use crate::region::{OutputLimits, DEFAULT_MAX_OUTPUT_PIXELS, DEFAULT_MAX_OUTPUT_SIDE};
use crate::tile::{is_valid_quality, DEFAULT_JPEG_QUALITY};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default slide directory.
pub const DEFAULT_SLIDES_DIR: &str = "./slides";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// WSI Deep Zoom - a Deep Zoom tile and region server for large images.
///
/// Serves every JPEG or PNG image in a directory as a Deep Zoom pyramid and
/// extracts arbitrary regions on demand.
#[derive(Parser, Debug, Clone)]
#[command(name = "wsi-deepzoom")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "WSI_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "WSI_PORT")]
    pub port: u16,

    /// Directory containing slide images.
    #[arg(long, default_value = DEFAULT_SLIDES_DIR, env = "WSI_SLIDES_DIR")]
    pub slides_dir: PathBuf,

    // =========================================================================
    // Pyramid Configuration
    // =========================================================================
    /// Tile edge length in pixels, excluding overlap.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "WSI_TILE_SIZE")]
    pub tile_size: u32,

    /// Overlap border in pixels on each interior tile edge.
    #[arg(long, default_value_t = DEFAULT_OVERLAP, env = "WSI_OVERLAP")]
    pub overlap: u32,

    /// Build pyramids over the bounding box a slide reports, if any.
    #[arg(long, default_value_t = true, env = "WSI_LIMIT_BOUNDS", action = ArgAction::Set)]
    pub limit_bounds: bool,

    // =========================================================================
    // Tile Configuration
    // =========================================================================
    /// Default JPEG quality for tile encoding (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "WSI_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Longest side of a region output in pixels (at most 65535).
    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_SIDE, env = "WSI_MAX_REGION_SIDE")]
    pub max_region_side: u32,

    /// Maximum width x height of a region output.
    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_PIXELS, env = "WSI_MAX_REGION_PIXELS")]
    pub max_region_pixels: u64,

    /// Tile cache capacity in bytes. 0 disables the cache.
    #[arg(long, default_value_t = 0, env = "WSI_CACHE_TILES")]
    pub cache_tiles: usize,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "WSI_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "WSI_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.pyramid_config()
            .validate()
            .map_err(|e| format!("Invalid pyramid settings: {}", e))?;

        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if self.max_region_side == 0 || self.max_region_side > DEFAULT_MAX_OUTPUT_SIDE {
            return Err(format!(
                "max_region_side must be between 1 and {}",
                DEFAULT_MAX_OUTPUT_SIDE
            ));
        }

        if self.max_region_pixels == 0 {
            return Err("max_region_pixels must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Immutable pyramid settings handed to the tile service.
    pub fn pyramid_config(&self) -> PyramidConfig {
        PyramidConfig::new(self.tile_size, self.overlap, self.limit_bounds)
    }

    /// Bounds on region output size handed to the tile service.
    pub fn region_limits(&self) -> OutputLimits {
        OutputLimits::new(self.max_region_side, self.max_region_pixels)
    }
}

// =============================================================================
// Tests
// =============================================================================
