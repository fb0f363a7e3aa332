//! Arbitrary region extraction.
//!
//! A region request names a rectangle in full-resolution pixels, possibly
//! partly or entirely outside the image, plus an optional display size:
//!
//! ```text
//!  ViewportRect ──clamp──▶ RegionCrop ──read (ds = 1)──▶ pixels
//!                                                         │
//!  TargetWindow? ─────────────fit_within──────────────────┤
//!                                                         ▼
//!                                              ExtractedRegion + ViewSummary
//! ```
//!
//! Clamping never fails. A rectangle outside the image collapses onto the
//! nearest edge pixel, so every crop is at least 1x1.
//!
//! # Example
//!
//! ```
//! use wsi_deepzoom::region::{fit_within, RegionExtractor, TargetWindow, ViewportRect};
//! use wsi_deepzoom::slide::InMemoryImage;
//! use image::RgbImage;
//!
//! let image = InMemoryImage::new(RgbImage::new(1000, 800));
//! let extractor = RegionExtractor::new(&image, true).unwrap();
//!
//! let crop = extractor.crop(ViewportRect::new(-50, -50, 200, 200));
//! assert_eq!(crop.size(), (150, 150));
//!
//! assert_eq!(fit_within((300, 200), TargetWindow::new(100, 100)), Some((100, 67)));
//! ```

mod extractor;

pub use extractor::{
    fit_within, ExtractedRegion, OutputLimits, RegionCrop, RegionExtractor, TargetWindow,
    ViewSummary, ViewportRect, DEFAULT_MAX_OUTPUT_PIXELS, DEFAULT_MAX_OUTPUT_SIDE,
};
