//! Video record models and the clip-job state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::media_info::MediaInfo;
use crate::output::ClipOutput;

/// Unique identifier for an ingested video.
///
/// Immutable once assigned; doubles as the on-disk directory key for the
/// video's artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Reviewer verdict on a video, orthogonal to the clip-job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Not yet reviewed
    #[default]
    Pending,
    /// Approved by a reviewer
    Approved,
    /// Rejected by a reviewer
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Clip-generation job state.
///
/// `InProgress` must never survive the process that set it; the startup
/// recovery sweep demotes leftover `InProgress` records to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClipJobState {
    /// No generation attempt has been made
    #[default]
    NotStarted,
    /// A generation job is running in this process
    InProgress,
    /// The last attempt completed and committed its outputs
    Done,
    /// The last attempt failed; see `last_error`
    Failed,
}

impl ClipJobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipJobState::NotStarted => "not_started",
            ClipJobState::InProgress => "in_progress",
            ClipJobState::Done => "done",
            ClipJobState::Failed => "failed",
        }
    }

    /// Check whether a job is currently owned by a running process.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ClipJobState::InProgress)
    }
}

impl fmt::Display for ClipJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ingested video and its associated job/review state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Unique video ID
    pub id: VideoId,

    /// Absolute path to the ingested source file
    pub source_path: PathBuf,

    /// Re-keyframed intermediate produced by the precise strategy.
    ///
    /// Set at most once per video and reused thereafter; a cache keyed by
    /// the source only, never invalidated automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared_path: Option<PathBuf>,

    /// Reviewer verdict
    #[serde(default)]
    pub review_status: ReviewStatus,

    /// Probed media metadata; absent until first probed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_info: Option<MediaInfo>,

    /// Clip-generation job state
    #[serde(default)]
    pub clip_state: ClipJobState,

    /// Diagnostic message from the last failed attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Output chunk descriptors, in emission order.
    ///
    /// Non-empty only when `clip_state` was last committed as `Done`.
    #[serde(default)]
    pub outputs: Vec<ClipOutput>,

    /// Wall-clock seconds of the most recent successful job run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_job_duration_secs: Option<f64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a fresh record for a newly ingested video.
    pub fn new(id: VideoId, source_path: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            id,
            source_path: source_path.into(),
            prepared_path: None,
            review_status: ReviewStatus::Pending,
            media_info: None,
            clip_state: ClipJobState::NotStarted,
            last_error: None,
            outputs: Vec::new(),
            last_job_duration_secs: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Begin a generation attempt: `InProgress`, error cleared.
    pub fn start_job(&mut self) {
        self.clip_state = ClipJobState::InProgress;
        self.last_error = None;
        self.updated_at = Utc::now();
    }

    /// Commit a successful attempt: outputs, `Done`, elapsed time.
    pub fn complete_job(&mut self, outputs: Vec<ClipOutput>, elapsed_secs: f64) {
        self.clip_state = ClipJobState::Done;
        self.outputs = outputs;
        self.last_error = None;
        self.last_job_duration_secs = Some(elapsed_secs);
        self.updated_at = Utc::now();
    }

    /// Commit a failed attempt: `Failed`, empty outputs, diagnostic message.
    pub fn fail_job(&mut self, error: impl Into<String>) {
        self.clip_state = ClipJobState::Failed;
        self.outputs = Vec::new();
        self.last_error = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Reset to `NotStarted` ahead of a forced regeneration.
    pub fn reset_job(&mut self) {
        self.clip_state = ClipJobState::NotStarted;
        self.outputs = Vec::new();
        self.last_error = None;
        self.updated_at = Utc::now();
    }

    /// Record the prepared-intermediate path (precise strategy, once).
    pub fn set_prepared_path(&mut self, path: impl Into<PathBuf>) {
        self.prepared_path = Some(path.into());
        self.updated_at = Utc::now();
    }

    /// Store probed metadata, overwriting any previous probe result.
    pub fn set_media_info(&mut self, info: MediaInfo) {
        self.media_info = Some(info);
        self.updated_at = Utc::now();
    }

    /// Update the reviewer verdict.
    pub fn set_review_status(&mut self, status: ReviewStatus) {
        self.review_status = status;
        self.updated_at = Utc::now();
    }
}
