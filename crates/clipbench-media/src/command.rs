//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use clipbench_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};

/// How much of the diagnostic stream is kept in logs and error messages.
const STDERR_TAIL_CHARS: usize = 500;

/// Builder for FFmpeg commands.
///
/// The caller assembles a fully explicit argument list; the runner never
/// interprets its semantics.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path or sequence pattern
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Stream-copy segmentation into fixed-duration chunks.
    ///
    /// `output` must be a zero-padded numeric sequence pattern
    /// (e.g. `clips/clip_%04d.mp4`). Chunk boundaries land on the nearest
    /// prior keyframe, so actual durations are approximate.
    pub fn segment_copy(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        chunk_secs: f64,
    ) -> Self {
        let segment_time = format!("{chunk_secs}");
        Self::new(input, output).output_args([
            "-map",
            "0",
            "-c",
            "copy",
            "-f",
            "segment",
            "-segment_time",
            segment_time.as_str(),
            "-reset_timestamps",
            "1",
        ])
    }

    /// One-time re-encode with keyframes forced at exact chunk boundaries.
    ///
    /// Segmenting the result yields exact-duration chunks.
    pub fn keyframe_prepare(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        chunk_secs: f64,
        encoding: &EncodingConfig,
    ) -> Self {
        Self::new(input, output)
            .output_arg("-force_key_frames")
            .output_arg(format!("expr:gte(t,n_forced*{chunk_secs})"))
            .output_args(encoding.to_ffmpeg_args())
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands.
///
/// No timeout and no cancellation: a launched tool runs to completion, and
/// abrupt process termination is repaired by the startup recovery sweep.
#[derive(Debug, Default)]
pub struct FfmpegRunner;

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }

    /// Run an FFmpeg command to completion, capturing the diagnostic stream.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        info!(
            command = %format!("ffmpeg {}", args.join(" ")),
            status = ?output.status.code(),
            stderr_tail = %tail(&stderr, STDERR_TAIL_CHARS),
            "ffmpeg finished"
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                format!("ffmpeg exited with status {:?}", output.status.code()),
                Some(tail(&stderr, STDERR_TAIL_CHARS).to_string()),
                output.status.code(),
            ))
        }
    }
}

/// Last `max` characters of a diagnostic stream.
pub(crate) fn tail(s: &str, max: usize) -> &str {
    let len = s.chars().count();
    if len <= max {
        return s;
    }
    let skip = len - max;
    let (idx, _) = s.char_indices().nth(skip).unwrap_or((0, ' '));
    &s[idx..]
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_copy_shape() {
        let cmd = FfmpegCommand::segment_copy("in.mp4", "clips/clip_%04d.mp4", 60.0);
        let args = cmd.build_args();

        assert_eq!(args[0], "-y");
        assert!(args.contains(&"-c".to_string()));
        assert!(args.contains(&"copy".to_string()));
        assert!(args.contains(&"-f".to_string()));
        assert!(args.contains(&"segment".to_string()));
        assert!(args.contains(&"-segment_time".to_string()));
        assert!(args.contains(&"60".to_string()));
        assert!(args.contains(&"-reset_timestamps".to_string()));
        assert_eq!(args.last().unwrap(), "clips/clip_%04d.mp4");
    }

    #[test]
    fn test_keyframe_prepare_shape() {
        let encoding = EncodingConfig::default();
        let cmd = FfmpegCommand::keyframe_prepare("in.mp4", "prepared.mp4", 120.0, &encoding);
        let args = cmd.build_args();

        assert!(args.contains(&"-force_key_frames".to_string()));
        assert!(args.contains(&"expr:gte(t,n_forced*120)".to_string()));
        assert!(args.contains(&"-preset".to_string()));
        assert!(args.contains(&"veryfast".to_string()));
        assert!(args.contains(&"-b:a".to_string()));
        assert_eq!(args.last().unwrap(), "prepared.mp4");
    }

    #[test]
    fn test_input_precedes_output_args() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .input_arg("-ss")
            .input_arg("5")
            .output_arg("-c")
            .output_arg("copy");
        let args = cmd.build_args();

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let i = args.iter().position(|a| a == "-i").unwrap();
        let c = args.iter().position(|a| a == "-c").unwrap();
        assert!(ss < i && i < c);
    }

    #[test]
    fn test_tail_bounds_long_streams() {
        let long = "x".repeat(1200);
        assert_eq!(tail(&long, 500).len(), 500);
        assert_eq!(tail("short", 500), "short");
    }
}
