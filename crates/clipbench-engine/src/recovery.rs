//! Startup recovery sweep.
//!
//! Runs once, before any orchestrator entry point is reachable. An
//! `InProgress` record at startup can only mean the owning process died
//! mid-job; the sweep demotes it to `Failed` so the invariant "`InProgress`
//! is never observed after its process exits" holds again.

use chrono::Utc;
use tracing::{info, warn};

use clipbench_models::ClipJobState;

use crate::error::EngineResult;
use crate::service::Library;

/// Diagnostic recorded on records repaired by the sweep.
pub const INTERRUPTED_JOB_ERROR: &str =
    "clip job was interrupted by process termination; retry required";

impl Library {
    /// Reconcile records left `InProgress` by an earlier process.
    ///
    /// Only `InProgress` records are touched. The sweep performs no disk
    /// cleanup and leaves `outputs` as last committed; the next attempt's
    /// clean-slate step deletes any partial chunk files.
    ///
    /// Returns the number of records repaired.
    pub async fn recover_interrupted(&self) -> EngineResult<u32> {
        let records = self.store.list().await?;
        let mut repaired = 0u32;

        for record in records {
            if !record.clip_state.is_in_flight() {
                continue;
            }

            warn!(
                video_id = %record.id,
                "found interrupted clip job; marking failed"
            );

            self.store
                .update(&record.id, |r| {
                    r.clip_state = ClipJobState::Failed;
                    r.last_error = Some(INTERRUPTED_JOB_ERROR.to_string());
                    r.updated_at = Utc::now();
                })
                .await?;
            repaired += 1;
        }

        if repaired > 0 {
            info!(repaired, "recovery sweep repaired interrupted jobs");
        }
        Ok(repaired)
    }
}
