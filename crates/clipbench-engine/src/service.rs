//! The `Library` facade: caller-facing operations over the store, the
//! toolkit, and the on-disk layout.

use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

use clipbench_media::{FfmpegToolkit, VideoToolkit};
use clipbench_models::{MediaInfo, ReviewStatus, VideoId, VideoRecord};
use clipbench_store::RecordStore;

use crate::config::EngineConfig;
use crate::error::{map_store, EngineError, EngineResult};
use crate::layout::LibraryLayout;

/// File extensions accepted at ingest.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "mkv", "webm"];

/// The video library: durable records plus the clip-generation engine.
///
/// One logical caller at a time per video; `generate`/`regenerate` must not
/// run concurrently for the same id.
pub struct Library {
    pub(crate) store: RecordStore,
    pub(crate) toolkit: Arc<dyn VideoToolkit>,
    pub(crate) layout: LibraryLayout,
    pub(crate) config: EngineConfig,
}

impl Library {
    /// Create a library with an explicit toolkit (tests inject a fake here).
    pub fn new(config: EngineConfig, toolkit: Arc<dyn VideoToolkit>) -> Self {
        let layout = LibraryLayout::new(&config.storage_root);
        let store = RecordStore::open(layout.store_path());
        Self {
            store,
            toolkit,
            layout,
            config,
        }
    }

    /// Create a library backed by the real ffmpeg toolkit.
    pub fn open(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(FfmpegToolkit::new()))
    }

    /// The on-disk layout in use.
    pub fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    /// List all records, newest first.
    pub async fn list(&self) -> EngineResult<Vec<VideoRecord>> {
        self.store.list().await.map_err(EngineError::from)
    }

    /// Fetch a single record.
    pub async fn get(&self, id: &VideoId) -> EngineResult<VideoRecord> {
        self.store.get(id).await.map_err(map_store)
    }

    /// Ingest a local file: validate, copy it under the storage root, and
    /// create the record.
    ///
    /// Validation failures reject the ingest before any record or on-disk
    /// state is created.
    pub async fn ingest(&self, source: &Path) -> EngineResult<VideoRecord> {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(EngineError::invalid_source(format!(
                "unsupported file extension {:?} (expected one of {})",
                extension,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        if !source.is_file() {
            return Err(EngineError::invalid_source(format!(
                "source file does not exist: {}",
                source.display()
            )));
        }

        let id = VideoId::new();
        let dest = self.layout.source_path(&id, &extension);
        fs::create_dir_all(self.layout.video_dir(&id)).await?;
        fs::copy(source, &dest).await?;

        let record = VideoRecord::new(id.clone(), &dest);
        self.store.create(record.clone()).await?;

        info!(
            video_id = %id,
            source = %source.display(),
            "ingested video"
        );
        Ok(record)
    }

    /// Probe the source file and store the result on the record.
    ///
    /// Overwrites any previous probe result.
    pub async fn probe_metadata(&self, id: &VideoId) -> EngineResult<MediaInfo> {
        let record = self.get(id).await?;
        let info = self.toolkit.probe(&record.source_path).await?;
        self.store
            .update(id, |r| r.set_media_info(info.clone()))
            .await
            .map_err(map_store)?;
        Ok(info)
    }

    /// Update the reviewer verdict.
    pub async fn set_review_status(
        &self,
        id: &VideoId,
        status: ReviewStatus,
    ) -> EngineResult<VideoRecord> {
        self.store
            .update(id, |r| r.set_review_status(status))
            .await
            .map_err(map_store)
    }

    /// Delete the record and every on-disk artifact. Unconditional and
    /// irreversible.
    pub async fn delete(&self, id: &VideoId) -> EngineResult<()> {
        self.store.delete(id).await.map_err(map_store)?;

        let dir = self.layout.video_dir(id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(EngineError::from(e)),
        }

        info!(video_id = %id, "deleted video and artifacts");
        Ok(())
    }
}
