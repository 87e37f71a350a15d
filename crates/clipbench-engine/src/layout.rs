//! On-disk artifact layout.
//!
//! Everything lives under one storage root:
//!
//! ```text
//! <root>/library.json              record store document
//! <root>/<id>/source.<ext>         ingested source file
//! <root>/<id>/prepared.mp4         precise-mode intermediate (optional)
//! <root>/<id>/clips/clip_NNNN.mp4  output chunks
//! ```

use std::path::{Path, PathBuf};

use clipbench_models::VideoId;

/// Record store document file name.
pub const LIBRARY_FILE: &str = "library.json";
/// Prepared-intermediate file name.
pub const PREPARED_FILE: &str = "prepared.mp4";
/// Per-video outputs subdirectory.
pub const CLIPS_DIR: &str = "clips";
/// Zero-padded output sequence pattern; name order equals emission order.
pub const CLIP_PATTERN: &str = "clip_%04d.mp4";

/// Path scheme for per-video artifacts under the storage root.
#[derive(Debug, Clone)]
pub struct LibraryLayout {
    root: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record store document.
    pub fn store_path(&self) -> PathBuf {
        self.root.join(LIBRARY_FILE)
    }

    /// Per-video artifact directory.
    pub fn video_dir(&self, id: &VideoId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Ingested source file path, preserving the original extension.
    pub fn source_path(&self, id: &VideoId, extension: &str) -> PathBuf {
        self.video_dir(id).join(format!("source.{extension}"))
    }

    /// Precise-mode prepared intermediate.
    pub fn prepared_path(&self, id: &VideoId) -> PathBuf {
        self.video_dir(id).join(PREPARED_FILE)
    }

    /// Output chunks directory.
    pub fn clips_dir(&self, id: &VideoId) -> PathBuf {
        self.video_dir(id).join(CLIPS_DIR)
    }

    /// Output sequence pattern handed to the segmentation command.
    pub fn clip_pattern(&self, id: &VideoId) -> PathBuf {
        self.clips_dir(id).join(CLIP_PATTERN)
    }
}
