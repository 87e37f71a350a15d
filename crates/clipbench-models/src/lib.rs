//! Shared data models for clipbench.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and their clip-job state machine
//! - Probed media metadata
//! - Output chunk descriptors
//! - Segmentation modes and encoding configuration

pub mod encoding;
pub mod media_info;
pub mod mode;
pub mod output;
pub mod record;

// Re-export common types
pub use encoding::EncodingConfig;
pub use media_info::MediaInfo;
pub use mode::SegmentMode;
pub use output::ClipOutput;
pub use record::{ClipJobState, ReviewStatus, VideoId, VideoRecord};
