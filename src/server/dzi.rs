//! Deep Zoom Image (DZI) manifest and tile path helpers.
//!
//! Pyramid levels are already numbered Deep Zoom style (0 = coarsest), so
//! tile paths map onto the pyramid without any level translation:
//!
//! ```text
//! /slides/{id}/dzi                         manifest (this module)
//! /slides/{id}/dzi_files/{level}/{col}_{row}.jpeg
//! ```

use crate::pyramid::PyramidDescriptor;

/// Image format advertised in manifests and used for tile file names.
pub const DZI_FORMAT: &str = "jpeg";

/// Generate a DZI XML descriptor.
///
/// # Example Output
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Image xmlns="http://schemas.microsoft.com/deepzoom/2008"
///        TileSize="256"
///        Overlap="1"
///        Format="jpeg">
///   <Size Width="46920" Height="33600" />
/// </Image>
/// ```
pub fn generate_dzi_xml(
    width: u32,
    height: u32,
    tile_size: u32,
    overlap: u32,
    format: &str,
) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Image xmlns="http://schemas.microsoft.com/deepzoom/2008"
       TileSize="{tile_size}"
       Overlap="{overlap}"
       Format="{format}">
  <Size Width="{width}" Height="{height}" />
</Image>"#
    )
}

/// DZI descriptor for a pyramid, sized to its base (bounds applied).
pub fn pyramid_dzi_xml(pyramid: &PyramidDescriptor) -> String {
    let (width, height) = pyramid.dimensions();
    generate_dzi_xml(
        width,
        height,
        pyramid.tile_size(),
        pyramid.overlap(),
        DZI_FORMAT,
    )
}

/// Parse DZI tile coordinates from a file name like "3_5.jpeg", "3_5.jpg" or "3_5".
///
/// Returns `(col, row)`.
pub fn parse_dzi_tile_coords(filename: &str) -> Option<(u32, u32)> {
    let name = filename
        .strip_suffix(".jpeg")
        .or_else(|| filename.strip_suffix(".jpg"))
        .unwrap_or(filename);

    let (col, row) = name.split_once('_')?;
    Some((col.parse().ok()?, row.parse().ok()?))
}
