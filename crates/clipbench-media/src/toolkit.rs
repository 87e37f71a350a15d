//! Toolkit seam between the orchestrator and the external tools.

use async_trait::async_trait;
use std::path::Path;

use clipbench_models::{EncodingConfig, MediaInfo};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_video;

/// The external-tool operations the orchestrator is built against.
///
/// Production uses [`FfmpegToolkit`]; tests substitute a fake so the
/// state machine can be exercised without ffmpeg on the path.
#[async_trait]
pub trait VideoToolkit: Send + Sync {
    /// Probe a media file for metadata.
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;

    /// Segment `input` into fixed-duration chunks via stream copy.
    ///
    /// `output_pattern` is a zero-padded numeric sequence pattern inside an
    /// existing directory.
    async fn segment_copy(
        &self,
        input: &Path,
        output_pattern: &Path,
        chunk_secs: f64,
    ) -> MediaResult<()>;

    /// Re-encode `input` with keyframes forced at exact chunk boundaries.
    async fn prepare_keyframes(
        &self,
        input: &Path,
        output: &Path,
        chunk_secs: f64,
    ) -> MediaResult<()>;
}

/// Production toolkit shelling out to ffprobe/ffmpeg.
#[derive(Debug, Default)]
pub struct FfmpegToolkit {
    encoding: EncodingConfig,
}

impl FfmpegToolkit {
    /// Create a toolkit with the default preparation encoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a toolkit with an explicit preparation encoding.
    pub fn with_encoding(encoding: EncodingConfig) -> Self {
        Self { encoding }
    }
}

#[async_trait]
impl VideoToolkit for FfmpegToolkit {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        probe_video(path).await
    }

    async fn segment_copy(
        &self,
        input: &Path,
        output_pattern: &Path,
        chunk_secs: f64,
    ) -> MediaResult<()> {
        let cmd = FfmpegCommand::segment_copy(input, output_pattern, chunk_secs);
        FfmpegRunner::new().run(&cmd).await
    }

    async fn prepare_keyframes(
        &self,
        input: &Path,
        output: &Path,
        chunk_secs: f64,
    ) -> MediaResult<()> {
        let cmd = FfmpegCommand::keyframe_prepare(input, output, chunk_secs, &self.encoding);
        FfmpegRunner::new().run(&cmd).await
    }
}
