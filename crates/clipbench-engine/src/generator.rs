//! The clip-generation state machine.
//!
//! State transitions on `clip_state`:
//! `NotStarted -> InProgress -> {Done, Failed}`, `Failed -> InProgress`
//! (retry), `Done -> NotStarted` (explicit regenerate only). `InProgress` is
//! committed to the store before any external tool runs, so a crash during a
//! job is observable by the recovery sweep.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tokio::fs;

use clipbench_media::MediaError;
use clipbench_models::{ClipJobState, ClipOutput, SegmentMode, VideoId, VideoRecord};

use crate::error::{map_store, EngineError, EngineResult};
use crate::logging::JobLogger;
use crate::service::Library;

/// Result of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    /// Output chunk descriptors, in emission order
    pub outputs: Vec<ClipOutput>,
    /// Wall-clock seconds; 0.0 when the idempotency check short-circuited
    pub elapsed_seconds: f64,
}

impl Library {
    /// Generate clips for a video.
    ///
    /// Idempotent: a `Done` record whose output files are all present on
    /// disk returns immediately without invoking any tool. Any other state
    /// runs a full attempt from a clean output directory.
    pub async fn generate(&self, id: &VideoId, mode: SegmentMode) -> EngineResult<JobOutcome> {
        let record = self.get(id).await?;
        let log = JobLogger::new(id, "generate_clips");

        // Idempotency check: state says done, and the disk agrees.
        if record.clip_state == ClipJobState::Done {
            if self.outputs_present(&record).await {
                log.log_progress("outputs verified on disk; skipping generation");
                return Ok(JobOutcome {
                    outputs: record.outputs,
                    elapsed_seconds: 0.0,
                });
            }
            log.log_warning("record is done but output files are missing; regenerating");
        }

        log.log_start(&format!("mode={mode}"));
        self.store
            .update(id, |r| r.start_job())
            .await
            .map_err(map_store)?;

        let started = Instant::now();
        match self.run_job(&record, mode, &log).await {
            Ok(outputs) => {
                let elapsed = started.elapsed().as_secs_f64();
                self.store
                    .update(id, |r| r.complete_job(outputs.clone(), elapsed))
                    .await
                    .map_err(map_store)?;
                log.log_completion(&format!(
                    "{} clips in {:.2}s",
                    outputs.len(),
                    elapsed
                ));
                Ok(JobOutcome {
                    outputs,
                    elapsed_seconds: elapsed,
                })
            }
            Err(e) => {
                let message = failure_message(&e);
                // Clean up partial output; the directory must not be left
                // half-populated.
                if let Err(cleanup) = self.wipe_clips_dir(id).await {
                    log.log_warning(&format!("failed to clean partial outputs: {cleanup}"));
                }
                self.store
                    .update(id, |r| r.fail_job(message.clone()))
                    .await
                    .map_err(map_store)?;
                log.log_error(&message);
                Err(EngineError::JobFailed(message))
            }
        }
    }

    /// Force a full re-run: wipe outputs, reset the record, generate.
    ///
    /// The prepared intermediate is deliberately kept; it is a function of
    /// the source only, not of the output state.
    pub async fn regenerate(&self, id: &VideoId, mode: SegmentMode) -> EngineResult<JobOutcome> {
        let _ = self.get(id).await?;
        let log = JobLogger::new(id, "regenerate_clips");
        log.log_start(&format!("mode={mode}"));

        self.wipe_clips_dir(id).await?;
        self.store
            .update(id, |r| r.reset_job())
            .await
            .map_err(map_store)?;

        self.generate(id, mode).await
    }

    /// Run one generation attempt: clean slate, strategy, output collection.
    async fn run_job(
        &self,
        record: &VideoRecord,
        mode: SegmentMode,
        log: &JobLogger,
    ) -> EngineResult<Vec<ClipOutput>> {
        let clips_dir = self.layout.clips_dir(&record.id);

        // Clean slate: no prior attempt's artifacts survive into this one.
        self.wipe_clips_dir(&record.id).await?;
        fs::create_dir_all(&clips_dir).await?;

        let input = match mode {
            SegmentMode::Fast => record.source_path.clone(),
            SegmentMode::Precise => self.ensure_prepared(record, log).await?,
        };

        let pattern = self.layout.clip_pattern(&record.id);
        self.toolkit
            .segment_copy(&input, &pattern, self.config.clip_duration_secs)
            .await?;

        self.collect_outputs(&record.id, log).await
    }

    /// Return the prepared intermediate, producing it once if needed.
    async fn ensure_prepared(
        &self,
        record: &VideoRecord,
        log: &JobLogger,
    ) -> EngineResult<PathBuf> {
        if let Some(prepared) = &record.prepared_path {
            if prepared.exists() {
                log.log_progress("reusing prepared intermediate");
                return Ok(prepared.clone());
            }
            log.log_warning("prepared intermediate missing on disk; rebuilding");
        }

        let prepared = self.layout.prepared_path(&record.id);
        log.log_progress("preparing re-keyframed intermediate (one-time cost)");
        self.toolkit
            .prepare_keyframes(
                &record.source_path,
                &prepared,
                self.config.clip_duration_secs,
            )
            .await?;

        self.store
            .update(&record.id, |r| r.set_prepared_path(prepared.clone()))
            .await
            .map_err(map_store)?;
        Ok(prepared)
    }

    /// Enumerate produced chunks and assemble their descriptors.
    ///
    /// Chunks are ordered by file name, which the zero-padded sequence
    /// pattern makes equal to emission order. Offsets accumulate real probed
    /// durations; a failed chunk probe falls back to the nominal duration
    /// and never fails the job.
    async fn collect_outputs(
        &self,
        id: &VideoId,
        log: &JobLogger,
    ) -> EngineResult<Vec<ClipOutput>> {
        let clips_dir = self.layout.clips_dir(id);
        let nominal = self.config.clip_duration_secs;

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&clips_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();

        if names.is_empty() {
            return Err(EngineError::job_failed(
                "segmentation produced no output files",
            ));
        }

        let mut outputs = Vec::with_capacity(names.len());
        let mut cursor = 0.0_f64;
        for name in names {
            let path = clips_dir.join(&name);
            let size_bytes = fs::metadata(&path).await.map(|m| m.len()).unwrap_or(0);

            let (duration_secs, fps, resolution) = match self.toolkit.probe(&path).await {
                Ok(info) => (info.duration_secs, Some(info.fps), Some(info.resolution)),
                Err(e) => {
                    log.log_warning(&format!(
                        "chunk probe failed for {name}: {e}; using nominal duration"
                    ));
                    (nominal, None, None)
                }
            };

            let start_secs = cursor;
            let end_secs = start_secs + duration_secs;
            outputs.push(ClipOutput {
                file_name: name,
                start_secs,
                end_secs,
                duration_secs,
                fps,
                resolution,
                size_bytes,
            });
            cursor = end_secs;
        }

        Ok(outputs)
    }

    /// True when the record lists outputs and every listed file exists.
    async fn outputs_present(&self, record: &VideoRecord) -> bool {
        if record.outputs.is_empty() {
            return false;
        }
        let clips_dir = self.layout.clips_dir(&record.id);
        for output in &record.outputs {
            if !clips_dir.join(&output.file_name).exists() {
                return false;
            }
        }
        true
    }

    /// Delete the outputs directory; no-op if absent.
    pub(crate) async fn wipe_clips_dir(&self, id: &VideoId) -> EngineResult<()> {
        let dir = self.layout.clips_dir(id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::from(e)),
        }
    }
}

/// Human-readable failure message embedding the tool's diagnostic tail.
fn failure_message(e: &EngineError) -> String {
    match e {
        EngineError::Media(MediaError::FfmpegFailed {
            message,
            stderr,
            exit_code,
        }) => {
            let mut msg = format!("transcode tool failed: {message}");
            if let Some(code) = exit_code {
                msg.push_str(&format!(" (exit code {code})"));
            }
            if let Some(stderr) = stderr {
                if !stderr.is_empty() {
                    msg.push_str(&format!("; stderr: {stderr}"));
                }
            }
            msg
        }
        other => format!("clip generation failed: {other}"),
    }
}
