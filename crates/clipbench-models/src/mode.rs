//! Segmentation execution modes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution strategy for a clip-generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    /// Stream-copy segmentation. Chunk boundaries land on the nearest prior
    /// keyframe, so actual durations deviate from the nominal duration.
    #[default]
    Fast,
    /// Re-encode once with forced keyframes at exact chunk boundaries, then
    /// segment the prepared intermediate. Exact durations, one-time cost.
    Precise,
}

impl SegmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentMode::Fast => "fast",
            SegmentMode::Precise => "precise",
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
