//! FFprobe metadata extraction.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use clipbench_models::MediaInfo;

use crate::command::{check_ffprobe, tail};
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    display_aspect_ratio: Option<String>,
    side_data_list: Option<Vec<FfprobeSideData>>,
    tags: Option<FfprobeTags>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FfprobeTags {
    rotate: Option<String>,
}

/// Probe a video file for metadata.
///
/// Byte size is read from the filesystem, not from the tool's `format`
/// section.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let args = [
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
    ];

    let output = Command::new("ffprobe")
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    debug!(
        command = %format!("ffprobe {} {}", args.join(" "), path.display()),
        status = ?output.status.code(),
        stderr_tail = %tail(&stderr, 500),
        "ffprobe finished"
    );

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            format!("ffprobe exited with status {:?}", output.status.code()),
            Some(tail(&stderr, 500).to_string()),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    let size_bytes = tokio::fs::metadata(path).await?.len();

    media_info_from(probe, size_bytes)
}

/// Assemble a `MediaInfo` from parsed ffprobe output.
fn media_info_from(probe: FfprobeOutput, size_bytes: u64) -> MediaResult<MediaInfo> {
    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("no video stream found".to_string()))?;

    let duration_secs = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps = video_stream
        .r_frame_rate
        .as_ref()
        .or(video_stream.avg_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(0.0);

    let width = video_stream.width.unwrap_or(0);
    let height = video_stream.height.unwrap_or(0);

    let aspect_ratio = video_stream
        .display_aspect_ratio
        .as_ref()
        .filter(|dar| !dar.is_empty() && dar.as_str() != "0:1")
        .cloned()
        .unwrap_or_else(|| reduce_aspect(width, height));

    Ok(MediaInfo {
        fps,
        resolution: format!("{}x{}", width, height),
        aspect_ratio,
        duration_secs,
        rotation: extract_rotation(video_stream),
        codec: video_stream.codec_name.clone().unwrap_or_default(),
        size_bytes,
    })
}

/// Rotation in degrees: the side-data entry wins, the legacy `rotate` tag is
/// the fallback, absent means 0.
fn extract_rotation(stream: &FfprobeStream) -> i32 {
    if let Some(side_data) = &stream.side_data_list {
        if let Some(rotation) = side_data.iter().find_map(|sd| sd.rotation) {
            return rotation as i32;
        }
    }
    stream
        .tags
        .as_ref()
        .and_then(|t| t.rotate.as_ref())
        .and_then(|r| r.parse::<i32>().ok())
        .unwrap_or(0)
}

/// Parse frame rate string (e.g., "30000/1001" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}

/// Reduce WxH to an aspect ratio string via gcd, e.g. 1920x1080 -> "16:9".
fn reduce_aspect(width: u32, height: u32) -> String {
    if width == 0 || height == 0 {
        return "0:0".to_string();
    }
    let g = gcd(width, height);
    format!("{}:{}", width / g, height / g)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
