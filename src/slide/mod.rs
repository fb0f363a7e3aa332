//! Image source layer.
//!
//! The engine never decodes slide containers itself. It reads pixels through
//! the [`ImageSource`] capability, and obtains one image handle per request
//! from a [`SlideSource`]:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! └────────────────────┬────────────────────┘
//!                      │ open(slide_id) per request
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            SlideSource Trait            │
//! │   (LocalSlideSource, test doubles)      │
//! └────────────────────┬────────────────────┘
//!                      │ owned handle, dropped on every exit path
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            ImageSource Trait            │
//! │  dimensions / bounding_box / read_region│
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use wsi_deepzoom::slide::{ImageSource, LocalSlideSource, SlideSource};
//!
//! let source = LocalSlideSource::new("./slides");
//! let image = source.open("sample.jpg").await?;
//! let (width, height) = image.dimensions();
//! let thumbnail = image.read_region((0, 0), 16, (width / 16, height / 16))?;
//! ```

mod local;
mod memory;
mod source;

pub use local::{LocalSlideSource, SLIDE_EXTENSIONS};
pub use memory::InMemoryImage;
pub use source::{ImageSource, SlideListResult, SlideSource};
