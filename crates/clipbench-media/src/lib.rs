//! FFmpeg CLI wrapper for clipbench.
//!
//! This crate provides:
//! - FFprobe metadata extraction (`probe_video`)
//! - An FFmpeg command builder with the two segmentation command shapes
//! - A runner capturing exit status and the diagnostic stream
//! - The `VideoToolkit` seam the orchestrator is built against

pub mod command;
pub mod error;
pub mod probe;
pub mod toolkit;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::probe_video;
pub use toolkit::{FfmpegToolkit, VideoToolkit};
