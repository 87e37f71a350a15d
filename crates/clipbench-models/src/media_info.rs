//! Probed media metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata extracted from a media file by the probe tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MediaInfo {
    /// Frame rate in frames per second (reduced rational, rendered decimal)
    pub fps: f64,
    /// Pixel dimensions as "WxH"
    pub resolution: String,
    /// Display aspect ratio, e.g. "16:9"
    pub aspect_ratio: String,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Rotation in degrees; 0 when the file declares none
    #[serde(default)]
    pub rotation: i32,
    /// Video codec identifier, e.g. "h264"
    pub codec: String,
    /// File size in bytes (from the filesystem, not the tool)
    pub size_bytes: u64,
}
