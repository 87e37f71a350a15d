//! Output chunk descriptors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One segmented output chunk.
///
/// `fps` and `resolution` are absent when the per-chunk probe failed; the
/// chunk's `duration_secs` then falls back to the nominal chunk duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipOutput {
    /// File name within the video's clips directory
    pub file_name: String,
    /// Start offset within the source, seconds
    pub start_secs: f64,
    /// End offset within the source, seconds
    pub end_secs: f64,
    /// Chunk duration, seconds
    pub duration_secs: f64,
    /// Chunk frame rate, if probed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Chunk resolution as "WxH", if probed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Chunk file size in bytes
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_optional_fields_roundtrip() {
        let output = ClipOutput {
            file_name: "clip_0000.mp4".to_string(),
            start_secs: 0.0,
            end_secs: 121.2,
            duration_secs: 121.2,
            fps: None,
            resolution: None,
            size_bytes: 0,
        };

        let json = serde_json::to_string(&output).unwrap();
        assert!(!json.contains("fps"));

        let back: ClipOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, output);
    }
}
