//! Whole-document JSON record store.
//!
//! Every mutation reads the full backing document, applies the change in
//! memory, and commits the entire document via write-to-temp-then-rename.
//! A crash mid-write leaves either the old or the new complete document on
//! disk, never a torn file.
//!
//! Single-process access is assumed. An internal mutex serializes individual
//! mutations; multi-step sequences (read, decide, write) must still be
//! serialized per record by the caller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use clipbench_models::{VideoId, VideoRecord};

use crate::error::{StoreError, StoreResult};

/// Current document schema version.
pub const DOCUMENT_VERSION: u32 = 1;

/// The persisted library document: an ordered collection of video records.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LibraryDocument {
    /// Schema version of the document on disk
    #[serde(default)]
    pub version: u32,
    /// All video records, in creation order
    #[serde(default)]
    pub records: Vec<VideoRecord>,
}

/// Migrate a loaded document to the current schema.
///
/// Field-level backfill happens at deserialization via `#[serde(default)]`
/// on every field added after the first release; this function is the single
/// document-level hook applied uniformly on every load.
fn migrate(mut doc: LibraryDocument) -> LibraryDocument {
    if doc.version < DOCUMENT_VERSION {
        debug!(
            from = doc.version,
            to = DOCUMENT_VERSION,
            "migrating library document"
        );
        doc.version = DOCUMENT_VERSION;
    }
    doc
}

/// Durable store for video records, backed by a single JSON document.
pub struct RecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Open a store backed by the given document path.
    ///
    /// The file is created lazily on the first mutation; a missing file
    /// reads as the empty document.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch a single record.
    pub async fn get(&self, id: &VideoId) -> StoreResult<VideoRecord> {
        let doc = self.load().await?;
        doc.records
            .into_iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// List all records, newest first.
    pub async fn list(&self) -> StoreResult<Vec<VideoRecord>> {
        let mut records = self.load().await?.records;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Insert a new record.
    pub async fn create(&self, record: VideoRecord) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        if doc.records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::AlreadyExists(record.id));
        }
        doc.records.push(record);
        self.commit(&doc).await
    }

    /// Apply a partial update to a record and commit the whole document.
    ///
    /// Fields not touched by the closure are preserved by construction.
    /// Returns the updated record.
    pub async fn update<F>(&self, id: &VideoId, mutate: F) -> StoreResult<VideoRecord>
    where
        F: FnOnce(&mut VideoRecord),
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let record = doc
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        mutate(record);
        let updated = record.clone();
        self.commit(&doc).await?;
        Ok(updated)
    }

    /// Remove a record.
    pub async fn delete(&self, id: &VideoId) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let before = doc.records.len();
        doc.records.retain(|r| &r.id != id);
        if doc.records.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.commit(&doc).await
    }

    /// Load and migrate the full document.
    async fn load(&self) -> StoreResult<LibraryDocument> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let doc: LibraryDocument = serde_json::from_slice(&bytes)?;
                Ok(migrate(doc))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(migrate(LibraryDocument::default()))
            }
            Err(e) => Err(StoreError::from(e)),
        }
    }

    /// Commit the full document: write a temp sibling, then rename over the
    /// live file. Rename within one directory is atomic on POSIX.
    async fn commit(&self, doc: &LibraryDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(doc)?;

        fs::write(&tmp_path, &bytes).await?;
        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            StoreError::from(e)
        })?;

        debug!(
            path = %self.path.display(),
            records = doc.records.len(),
            "committed library document"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> RecordStore {
        RecordStore::open(dir.path().join("library.json"))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let record = VideoRecord::new(VideoId::new(), "/data/v/source.mp4");
        let id = record.id.clone();

        store.create(record).await.unwrap();
        let loaded = store.get(&id).await.unwrap();
        assert_eq!(loaded.id, id);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.get(&VideoId::from("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let record = VideoRecord::new(VideoId::from("dup"), "/data/v/source.mp4");

        store.create(record.clone()).await.unwrap();
        let err = store.create(record).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_update_preserves_untouched_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut record = VideoRecord::new(VideoId::new(), "/data/v/source.mp4");
        record.last_error = Some("old error".to_string());
        let id = record.id.clone();
        store.create(record).await.unwrap();

        let updated = store
            .update(&id, |r| r.set_review_status(clipbench_models::ReviewStatus::Approved))
            .await
            .unwrap();

        assert_eq!(updated.review_status, clipbench_models::ReviewStatus::Approved);
        assert_eq!(updated.last_error.as_deref(), Some("old error"));
        assert_eq!(updated.source_path, PathBuf::from("/data/v/source.mp4"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store
            .update(&VideoId::from("nope"), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let record = VideoRecord::new(VideoId::new(), "/data/v/source.mp4");
        let id = record.id.clone();
        store.create(record).await.unwrap();

        store.delete(&id).await.unwrap();
        assert!(matches!(
            store.get(&id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            store.delete(&id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut older = VideoRecord::new(VideoId::from("older"), "/data/a/source.mp4");
        older.created_at = Utc::now() - Duration::seconds(60);
        let newer = VideoRecord::new(VideoId::from("newer"), "/data/b/source.mp4");

        store.create(older).await.unwrap();
        store.create(newer).await.unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records[0].id.as_str(), "newer");
        assert_eq!(records[1].id.as_str(), "older");
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .create(VideoRecord::new(VideoId::new(), "/data/v/source.mp4"))
            .await
            .unwrap();

        assert!(dir.path().join("library.json").exists());
        assert!(!dir.path().join("library.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_legacy_document_loads_and_migrates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");

        // Document persisted by an older release: no version, records missing
        // every field added since.
        let legacy = r#"{
            "records": [{
                "id": "legacy",
                "source_path": "/data/legacy/source.mp4",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }]
        }"#;
        std::fs::write(&path, legacy).unwrap();

        let store = RecordStore::open(&path);
        let record = store.get(&VideoId::from("legacy")).await.unwrap();
        assert_eq!(record.clip_state, clipbench_models::ClipJobState::NotStarted);
        assert!(record.outputs.is_empty());
        assert!(record.prepared_path.is_none());
    }
}
