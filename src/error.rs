use thiserror::Error;

/// I/O errors raised by an image source while opening or reading a slide
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// No slide exists under the requested identifier
    #[error("Slide not found: {0}")]
    NotFound(String),

    /// The underlying storage could not be read
    #[error("Read error: {0}")]
    Read(String),

    /// The slide bytes could not be decoded into pixels (truncated or corrupt)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Requested read rectangle starts outside the source image
    #[error("Region out of bounds: origin ({x}, {y}) outside {width}x{height} image")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Invalid pyramid geometry, rejected before any tile is served
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Tile size must be at least one pixel
    #[error("Invalid tile size: {0} (must be greater than 0)")]
    InvalidTileSize(u32),

    /// Overlap must be strictly smaller than the tile size
    #[error("Invalid overlap: {overlap} (must be smaller than tile size {tile_size})")]
    InvalidOverlap { overlap: u32, tile_size: u32 },

    /// Image has a zero dimension
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Bounding box is empty or extends past the raw image
    #[error(
        "Invalid bounding box ({x}, {y}, {width}x{height}) for {image_width}x{image_height} image"
    )]
    InvalidBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
}

/// Errors returned by the tile service for tile, region and manifest requests
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Slide does not exist in the source
    #[error("Slide not found: {slide_id}")]
    SlideNotFound { slide_id: String },

    /// Level is outside the pyramid
    #[error("Invalid level: {level} (pyramid has {level_count} levels)")]
    InvalidLevel { level: u32, level_count: u32 },

    /// Tile coordinates are outside the level's grid
    #[error("Tile ({col}, {row}) out of bounds at level {level} (grid is {cols}x{rows})")]
    TileOutOfBounds {
        level: u32,
        col: u32,
        row: u32,
        cols: u32,
        rows: u32,
    },

    /// Malformed or missing request field
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// JPEG quality outside 1-100
    #[error("Invalid quality: {quality} (must be 1-100)")]
    InvalidQuality { quality: u8 },

    /// Slide geometry cannot form a pyramid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Source read failure
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Output encoding failure
    #[error("Failed to encode image: {message}")]
    EncodeError { message: String },
}

impl TileError {
    /// Whether the error means "nothing exists at this address".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TileError::SlideNotFound { .. }
                | TileError::InvalidLevel { .. }
                | TileError::TileOutOfBounds { .. }
                | TileError::Io(IoError::NotFound(_))
        )
    }
}
