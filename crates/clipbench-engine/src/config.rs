//! Engine configuration.

use std::path::PathBuf;

/// Default nominal chunk duration in seconds.
pub const DEFAULT_CLIP_DURATION_SECS: f64 = 60.0;

/// Engine configuration.
///
/// The storage root is always injected explicitly; nothing is derived from
/// the process working directory at runtime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory for the record store and all per-video artifacts
    pub storage_root: PathBuf,
    /// Nominal duration of each output chunk, seconds
    pub clip_duration_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("clipbench-data"),
            clip_duration_secs: DEFAULT_CLIP_DURATION_SECS,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            storage_root: std::env::var("CLIPBENCH_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("clipbench-data")),
            clip_duration_secs: std::env::var("CLIPBENCH_CLIP_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CLIP_DURATION_SECS),
        }
    }
}
