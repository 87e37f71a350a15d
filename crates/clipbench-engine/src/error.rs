//! Engine error types.

use thiserror::Error;

use clipbench_media::MediaError;
use clipbench_models::VideoId;
use clipbench_store::StoreError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("video not found: {0}")]
    NotFound(VideoId),

    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("clip job failed: {0}")]
    JobFailed(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSource(msg.into())
    }

    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }
}

/// Surface a store-level miss as the engine's own `NotFound`.
pub(crate) fn map_store(e: StoreError) -> EngineError {
    match e {
        StoreError::NotFound(id) => EngineError::NotFound(id),
        other => EngineError::Store(other),
    }
}
