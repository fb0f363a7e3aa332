//! Directory-backed slide source.
//!
//! Each slide is a JPEG or PNG file directly inside the slide directory; the
//! file name is the slide identifier. Files are decoded on every `open`, so a
//! handle holds a private copy of the pixels for the duration of one request.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::IoError;

use super::memory::InMemoryImage;
use super::source::{SlideListResult, SlideSource};

/// File extensions served as slides.
pub const SLIDE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Check if a file name has a supported slide extension.
fn is_slide_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    SLIDE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Slide identifiers must name a file directly inside the root.
fn is_valid_slide_id(slide_id: &str) -> bool {
    !slide_id.is_empty()
        && slide_id != "."
        && slide_id != ".."
        && !slide_id.contains(['/', '\\'])
        && !slide_id.contains('\0')
}

/// Slide source reading image files from a local directory.
#[derive(Debug, Clone)]
pub struct LocalSlideSource {
    root: PathBuf,
}

impl LocalSlideSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl SlideSource for LocalSlideSource {
    type Image = InMemoryImage;

    async fn open(&self, slide_id: &str) -> Result<Self::Image, IoError> {
        if !is_valid_slide_id(slide_id) || !is_slide_file(slide_id) {
            return Err(IoError::NotFound(slide_id.to_string()));
        }

        let path = self.root.join(slide_id);
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => IoError::NotFound(slide_id.to_string()),
            _ => IoError::Read(format!("{}: {}", path.display(), e)),
        })?;

        InMemoryImage::decode(&bytes)
    }

    async fn list_slides(&self) -> Result<SlideListResult, IoError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| IoError::Read(format!("{}: {}", self.root.display(), e)))?;

        let mut slides = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| IoError::Read(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_slide_file(name) {
                    slides.push(name.to_string());
                }
            }
        }

        slides.sort();
        Ok(SlideListResult { slides })
    }
}
